use clap::{Parser, Subcommand};
use smileforge_mesh::Vector3;

fn parse_vector(s: &str) -> Result<Vector3, String> {
    let parts = s
        .split(',')
        .map(|c| c.trim().parse::<f32>().map_err(|e| format!("{}: {}", c, e)))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z but got {:?}", s)),
    }
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    pub stl_path: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    pub stl_path: String,

    /// Output path for the edited stl.
    #[arg(short, long)]
    pub output: String,

    /// Vertex indices to delete, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub vertices: Vec<u32>,

    /// Also delete every vertex within `radius` of this point (x,y,z).
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub center: Option<Vector3>,

    #[arg(long, default_value_t = 1.0)]
    pub radius: f32,
}

#[derive(clap::Args, Debug)]
pub struct CropArgs {
    pub stl_path: String,

    /// Output path for the cropped stl.
    #[arg(short, long)]
    pub output: String,

    /// Minimum corner of the box to keep (x,y,z).
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub min: Vector3,

    /// Maximum corner of the box to keep (x,y,z).
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub max: Vector3,
}

#[derive(clap::Args, Debug)]
pub struct OutlineArgs {
    pub stl_path: String,

    /// Output path for the svg file.
    #[arg(short, long)]
    pub output: String,

    /// Direction the camera looks along (x,y,z).
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true, default_value = "0,0,-1")]
    pub view: Vector3,

    /// Photo width in pixels.
    #[arg(long, default_value_t = 4000.0)]
    pub width: f32,

    /// Photo height in pixels.
    #[arg(long, default_value_t = 3000.0)]
    pub height: f32,

    /// Focal length in millimetres.
    #[arg(long, default_value_t = 26.0)]
    pub focal_length: f32,

    /// Sensor width in millimetres.
    #[arg(long, default_value_t = 36.0)]
    pub sensor_width: f32,

    /// Camera to subject distance in millimetres.
    #[arg(long, default_value_t = 300.0)]
    pub distance: f32,

    /// Camera pitch in degrees.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub pitch: f32,
}

#[derive(clap::Args, Debug)]
pub struct ContactsArgs {
    /// The arch whose top surface is sampled.
    pub lower: String,

    /// The antagonist arch.
    pub upper: String,

    /// Minimum number of occlusal samples.
    #[arg(long, default_value_t = 200)]
    pub density: usize,

    /// Gaps up to this many millimetres count as contacts.
    #[arg(long, default_value_t = 0.1)]
    pub tolerance: f32,

    /// Slide the lower arch by up to this offset (x,y,z) to simulate an excursion.
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub excursion: Option<Vector3>,

    /// Number of positions evaluated along the excursion.
    #[arg(long, default_value_t = 5)]
    pub steps: u32,
}

#[derive(clap::Args, Debug)]
pub struct AxisArgs {
    pub stl_path: String,

    /// Largest tilt from vertical in degrees.
    #[arg(long, default_value_t = 30.0)]
    pub max_tilt: f32,

    /// Tilt increment in degrees.
    #[arg(long, default_value_t = 5.0)]
    pub tilt_step: f32,

    #[arg(long, default_value_t = 12)]
    pub azimuths: u32,

    /// Score penalty per radian of tilt.
    #[arg(long, default_value_t = 0.1)]
    pub angle_weight: f32,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log more; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print vertex, triangle and bounds information.
    Info(InfoArgs),
    /// Delete vertices and the triangles that use them.
    Delete(DeleteArgs),
    /// Keep only the triangles inside a box.
    Crop(CropArgs),
    /// Project the mesh silhouette onto a photo frame and write it as svg.
    Outline(OutlineArgs),
    /// Estimate occlusal contacts between two arches.
    Contacts(ContactsArgs),
    /// Find the best insertion axis for a prepared tooth.
    Axis(AxisArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_parse() {
        assert_eq!(Ok(Vector3::new(1.0, -2.5, 3.0)), parse_vector("1, -2.5,3"));
        assert!(parse_vector("1,2").is_err());
        assert!(parse_vector("a,b,c").is_err());
    }

    #[test]
    fn crop_accepts_negative_corners() {
        let args = Args::try_parse_from([
            "smileforge", "crop", "in.stl", "-o", "out.stl", "--min", "-1,-1,-1", "--max", "1,1,1",
        ])
        .unwrap();
        match args.command {
            Commands::Crop(crop) => assert_eq!(Vector3::new(-1.0, -1.0, -1.0), crop.min),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
