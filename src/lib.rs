//! Interactive viewer for triangle meshes and point clouds.
//!
//! Build a scene by adding [`Mesh`] and [`PointCloud`] objects to a [`Viewer`],
//! hook callbacks onto it, then call [`Viewer::show`].

mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod loaders;
pub mod mesh;
pub mod point_cloud;
pub mod renderer;
pub mod texture;
pub mod transform;
pub mod types;
pub mod viewer;

pub use camera::Camera;
pub use config::ViewerConfig;
pub use error::{Error, Result};
pub use frame::FrameInfo;
pub use input::Action;
pub use mesh::{Mesh, ShadingType};
pub use point_cloud::PointCloud;
pub use texture::{Texture, TextureType};
pub use transform::Transformable;
pub use viewer::Viewer;

pub use glam::{Mat4, Vec2, Vec3};
pub use winit::event::MouseButton;
pub use winit::keyboard::{KeyCode, ModifiersState};
