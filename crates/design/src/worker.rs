use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use smileforge_mesh::{
    compute_vertex_normals, crop_to_bounds, delete_triangles, delete_vertices, Mesh, MeshResult,
    Vector3,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    DeleteVertices(HashSet<u32>),
    DeleteTriangles(HashSet<u32>),
    CropToBounds { min: Vector3, max: Vector3 },
    ComputeNormals,
}

impl EditOp {
    pub fn apply(&self, mesh: &Mesh) -> MeshResult<Mesh> {
        match self {
            EditOp::DeleteVertices(vertices) => delete_vertices(mesh, vertices),
            EditOp::DeleteTriangles(triangles) => delete_triangles(mesh, triangles),
            EditOp::CropToBounds { min, max } => crop_to_bounds(mesh, *min, *max),
            EditOp::ComputeNormals => compute_vertex_normals(mesh),
        }
    }
}

/// An edit to run off the calling thread. The input mesh is shared, never modified.
#[derive(Debug, Clone)]
pub struct EditJob {
    pub id: u64,
    pub mesh: Arc<Mesh>,
    pub op: EditOp,
}

/// The single message produced for each [`EditJob`].
#[derive(Debug)]
pub struct EditOutcome {
    pub id: u64,
    pub result: MeshResult<Mesh>,
}

enum WorkerCommand {
    Edit(EditJob),
    Shutdown,
}

/// Runs mesh edits on a background thread, one at a time in submission order.
pub struct EditWorker {
    tx_cmd: Sender<WorkerCommand>,
    rx_evt: Receiver<EditOutcome>,
    thread: Option<JoinHandle<()>>,
}

impl EditWorker {
    pub fn spawn() -> std::io::Result<Self> {
        let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCommand>();
        let (tx_evt, rx_evt) = mpsc::channel::<EditOutcome>();

        let thread = thread::Builder::new()
            .name("mesh-edit-worker".to_string())
            .spawn(move || worker_loop(rx_cmd, tx_evt))?;

        Ok(Self {
            tx_cmd,
            rx_evt,
            thread: Some(thread),
        })
    }

    /// Queues a job. Returns false if the worker has stopped.
    pub fn submit(&self, job: EditJob) -> bool {
        self.tx_cmd.send(WorkerCommand::Edit(job)).is_ok()
    }

    pub fn try_recv(&self) -> Option<EditOutcome> {
        self.rx_evt.try_recv().ok()
    }

    /// Blocks until the next outcome arrives or the worker has stopped.
    pub fn recv(&self) -> Option<EditOutcome> {
        self.rx_evt.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EditOutcome> {
        self.rx_evt.recv_timeout(timeout).ok()
    }

    /// Finishes the queued jobs and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.tx_cmd.send(WorkerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("mesh edit worker panicked");
            }
        }
    }
}

impl Drop for EditWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(rx_cmd: Receiver<WorkerCommand>, tx_evt: Sender<EditOutcome>) {
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            WorkerCommand::Edit(job) => {
                log::trace!("edit job {} started", job.id);
                let result = job.op.apply(&job.mesh);
                if let Err(e) = &result {
                    log::debug!("edit job {} failed: {} ({})", job.id, e, e.code());
                }
                if tx_evt.send(EditOutcome { id: job.id, result }).is_err() {
                    // Nobody is listening any more.
                    break;
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
}
