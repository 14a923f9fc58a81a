//! Red vertex-coloured sphere next to an orange cube.
//!
//! Run with `cargo run --example basic`.
use meshview::{ShadingType, Vec3, Viewer};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut viewer = Viewer::new();
    viewer.draw_axes = false;

    let sphere = viewer.add_sphere(Vec3::ZERO, 0.5);
    sphere.shading_type = ShadingType::Vertex;
    sphere.set_verts_rgb(Vec3::new(1.0, 0.0, 0.0));

    viewer.add_cube(Vec3::new(2.0, 0.0, 0.0), 0.25);

    viewer.show()
}
