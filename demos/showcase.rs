//! Textured and animated scene with an egui control panel.
//!
//! Space pauses the animation, P toggles the point cloud and the arrow keys
//! move the textured pyramid, repeating while held.
use glam::{Mat3, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use meshview::{
    Action, KeyCode, Mesh, PointCloud, Texture, TextureType, Transformable, Vec3, Viewer,
};

const CHECKER_SIZE: u32 = 8;
const STRIPE_COUNT: u32 = 8;
const CLOUD_POINTS: usize = 2000;
const CLOUD_SEED: u64 = 42;
/// Index of the textured pyramid in `Viewer::meshes`
const TEXTURED_PYRAMID: usize = 4;
const MOVE_STEP: f32 = 0.1;

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let h_prime = (h * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Vec3::new(r + m, g + m, b + m)
}

fn checkerboard() -> anyhow::Result<Texture> {
    let mut data = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 3) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let v = if (x + y) % 2 == 0 { 0.9 } else { 0.2 };
            data.extend_from_slice(&[v, v, 1.0]);
        }
    }
    Ok(Texture::from_pixels(CHECKER_SIZE, CHECKER_SIZE, 3, data)?)
}

/// Grey horizontal stripes, bright rows shine and dark rows stay matte
fn specular_stripes() -> anyhow::Result<Texture> {
    let mut data = Vec::with_capacity((STRIPE_COUNT * STRIPE_COUNT) as usize);
    for y in 0..STRIPE_COUNT {
        let v = if y % 2 == 0 { 1.0 } else { 0.1 };
        data.extend(std::iter::repeat(v).take(STRIPE_COUNT as usize));
    }
    Ok(Texture::from_pixels(STRIPE_COUNT, STRIPE_COUNT, 1, data)?)
}

/// Seeded so the cloud looks the same on every run
fn random_cloud() -> anyhow::Result<PointCloud> {
    let mut rng = StdRng::seed_from_u64(CLOUD_SEED);
    let mut positions = Vec::with_capacity(CLOUD_POINTS);
    let mut colors = Vec::with_capacity(CLOUD_POINTS);
    for _ in 0..CLOUD_POINTS {
        let p = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        positions.push(p);
        colors.push(hsv_to_rgb((p.y + 1.0) * 0.5, 0.9, 1.0));
    }
    let mut cloud = PointCloud::from_points(&positions, &colors)?;
    cloud.set_point_size(3.0);
    cloud.translate(Vec3::new(-3.0, 0.0, 0.0));
    Ok(cloud)
}

const PYRAMID_POSITIONS: [Vec3; 5] = [
    Vec3::new(-0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, -0.5),
    Vec3::new(0.5, 0.0, 0.5),
    Vec3::new(-0.5, 0.0, 0.5),
    Vec3::new(0.0, 0.8, 0.0),
];
const PYRAMID_FACES: [[u32; 3]; 6] = [[0, 1, 2], [0, 2, 3], [0, 4, 1], [1, 4, 2], [2, 4, 3], [3, 4, 0]];

/// Flat, vertex-coloured and textured pyramids in a row
fn pyramids(checker: Texture) -> anyhow::Result<[Mesh; 3]> {
    let mut flat = Mesh::with_color(&PYRAMID_POSITIONS, &PYRAMID_FACES, Vec3::new(0.3, 0.8, 0.4), &[])?;
    flat.translate(Vec3::new(-1.5, -1.0, 2.0));

    let colors: Vec<Vec3> = (0..PYRAMID_POSITIONS.len())
        .map(|i| hsv_to_rgb(i as f32 / PYRAMID_POSITIONS.len() as f32, 0.7, 0.9))
        .collect();
    let mut colored = Mesh::from_vertices(&PYRAMID_POSITIONS, &PYRAMID_FACES, &colors, &[])?;
    colored.translate(Vec3::new(0.0, -1.0, 2.0));

    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.5, 0.5),
    ];
    let mut textured = Mesh::from_vertices(&PYRAMID_POSITIONS, &PYRAMID_FACES, &[], &[])?;
    textured
        .set_tex_coords(&uvs, &PYRAMID_FACES)?
        .add_texture(TextureType::Diffuse, checker)
        .translate(Vec3::new(1.5, -1.0, 2.0));

    Ok([flat, colored, textured])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut viewer = Viewer::new();
    viewer.title = "meshview showcase".to_string();
    viewer.background = Vec3::splat(0.12);
    viewer.loop_wait_events = false;

    let checker = checkerboard()?;
    let cube = viewer.add_cube(Vec3::ZERO, 1.0);
    cube.clear_textures(TextureType::Diffuse)
        .add_texture(TextureType::Diffuse, checker.clone())
        .add_texture(TextureType::Specular, specular_stripes()?)
        .set_shininess(32.0);

    viewer.add_sphere(Vec3::new(2.0, 0.0, 0.0), 0.6).set_shininess(64.0);
    for pyramid in pyramids(checker)? {
        viewer.add_mesh(pyramid);
    }
    viewer.add_point_cloud(random_cloud()?);
    viewer.add_line_with(Vec3::new(-3.0, -1.2, 0.0), Vec3::new(3.0, -1.2, 0.0), Vec3::Y);

    let mut paused = false;
    viewer.on_key = Some(Box::new(move |v, key, action, _mods| {
        match key {
            KeyCode::ArrowLeft | KeyCode::ArrowRight | KeyCode::ArrowUp | KeyCode::ArrowDown
                if action.is_down() =>
            {
                let step = match key {
                    KeyCode::ArrowLeft => Vec3::NEG_X,
                    KeyCode::ArrowRight => Vec3::X,
                    KeyCode::ArrowUp => Vec3::Y,
                    _ => Vec3::NEG_Y,
                };
                if let Some(pyramid) = v.get_mesh_mut(TEXTURED_PYRAMID) {
                    pyramid.translate(step * MOVE_STEP);
                }
                false
            }
            _ if action != Action::Press => true,
            KeyCode::Space => {
                paused = !paused;
                v.loop_wait_events = paused;
                false
            }
            KeyCode::KeyP => {
                if let Some(cloud) = v.get_point_cloud_mut(0) {
                    cloud.enabled = !cloud.enabled;
                }
                false
            }
            _ => true,
        }
    }));

    viewer.on_loop = Some(Box::new(|v| {
        if !v.loop_wait_events {
            let delta = v.frame().delta;
            if let Some(cube) = v.get_mesh_mut(0) {
                cube.rotate(Mat3::from_rotation_y(delta * 0.8));
            }
        }
        false
    }));

    let mut sphere_color = [1.0_f32, 0.5, 0.0];
    viewer.on_gui = Some(Box::new(move |v, ctx| {
        let mut changed = false;
        egui::Window::new("Scene").show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", v.fps()));
            ui.checkbox(&mut v.draw_axes, "Axes");
            ui.checkbox(&mut v.wireframe, "Wireframe");
            ui.checkbox(&mut v.cull_face, "Cull back faces");

            let mut ambient = v.light_color_ambient.x;
            if ui
                .add(egui::Slider::new(&mut ambient, 0.0..=1.0).text("Ambient"))
                .changed()
            {
                v.light_color_ambient = Vec3::splat(ambient);
            }

            if let Some(cloud) = v.get_point_cloud_mut(0) {
                ui.add(egui::Slider::new(&mut cloud.point_size, 1.0..=10.0).text("Point size"));
            }

            if ui.color_edit_button_rgb(&mut sphere_color).changed() {
                if let Some(sphere) = v.get_mesh_mut(1) {
                    sphere
                        .clear_textures(TextureType::Diffuse)
                        .add_texture(
                            TextureType::Diffuse,
                            Texture::from_color(Vec3::from_array(sphere_color)),
                        )
                        .update();
                }
            }

            if ui.button("Reset camera").clicked() {
                v.camera.reset_view();
                v.camera.reset_proj();
            }
            changed |= ui.button("Re-upload all").clicked();
        });
        changed
    }));

    viewer.show()
}
