use anyhow::Result;
use clap::Parser;
use glam::Vec3;

use meshview::cli::Cli;
use meshview::loaders::load_meshes;
use meshview::{PointCloud, ShadingType, Transformable, Viewer, ViewerConfig};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let config = cli.merge_into(config);

    let mut viewer = Viewer::new();
    viewer.apply_config(&config);

    if cli.files.is_empty() {
        log::info!("No input files, showing the demo scene");
        demo_scene(&mut viewer);
    } else {
        for path in &cli.files {
            let meshes = load_meshes(path)?;
            log::info!("Loaded {} mesh(es) from {:?}", meshes.len(), path);
            for mesh in meshes {
                if cli.points {
                    let mut cloud = PointCloud::from_points(mesh.verts_pos(), mesh.verts_rgb())?;
                    cloud.set_point_size(cli.point_size);
                    *cloud.transform_mut() = mesh.transform;
                    viewer.add_point_cloud(cloud);
                }
                viewer.add_mesh(mesh);
            }
        }
        if config.camera.center.is_none() && config.camera.distance.is_none() {
            frame_scene(&mut viewer);
        }
    }

    viewer.show()
}

fn demo_scene(viewer: &mut Viewer) {
    let sphere = viewer.add_sphere(Vec3::ZERO, 0.5);
    sphere.shading_type = ShadingType::Vertex;
    sphere.set_verts_rgb(Vec3::new(1.0, 0.0, 0.0));
    viewer.add_cube(Vec3::new(2.0, 0.0, 0.0), 0.25);
    viewer.add_line_with(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(3.0, -1.0, 0.0), Vec3::new(0.0, 0.4, 1.0));
}

/// Point the camera at the bounding box of everything loaded
fn frame_scene(viewer: &mut Viewer) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for mesh in &viewer.meshes {
        for p in mesh.verts_pos() {
            let p = mesh.transform.transform_point3(*p);
            min = min.min(p);
            max = max.max(p);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return;
    }

    let radius = ((max - min).length() * 0.5).max(1e-3);
    let camera = &mut viewer.camera;
    camera.center_of_rot = (min + max) * 0.5;
    camera.dist_to_center = radius / (camera.fovy * 0.5).tan() * 1.2;
    camera.update_view();
    camera.update_proj();
    camera.set_home();
}
