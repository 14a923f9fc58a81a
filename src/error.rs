use thiserror::Error;

/// Validation errors raised while building meshes, point clouds and textures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("vertex count {0} is not a multiple of 3 and no faces were given")]
    VertexCountNotMultipleOfThree(usize),

    #[error("{what} has {actual} rows, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("positions cannot be empty")]
    EmptyPositions,

    #[error("face {face} references vertex {index}, but there are only {n_verts} vertices")]
    FaceIndexOutOfRange { face: usize, index: u32, n_verts: usize },

    #[error("texture coordinate {0} is not used by any texture face")]
    UnmatchedTexCoord(usize),

    #[error("{n_coords} texture coordinates cannot cover {n_verts} vertices")]
    TooFewTexCoords { n_verts: usize, n_coords: usize },

    #[error("unsupported channel count {0}, expected 1, 3 or 4")]
    InvalidChannelCount(usize),

    #[error("image data has {actual} values, expected {expected}")]
    ImageSizeMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_problem() {
        let err = Error::FaceIndexOutOfRange { face: 2, index: 9, n_verts: 4 };
        let msg = err.to_string();
        assert!(msg.contains("face 2"));
        assert!(msg.contains("vertex 9"));

        let err = Error::LengthMismatch { what: "rgb", expected: 3, actual: 5 };
        assert_eq!(err.to_string(), "rgb has 5 rows, expected 3");
    }
}
