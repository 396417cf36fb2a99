/// Why a mint form cannot be submitted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingName,
    MissingDescription,
    MissingImage,
    ImageTooLarge { size: usize, limit: usize },
    InvalidContentId(String),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "name is required"),
            Self::MissingDescription => write!(f, "description is required"),
            Self::MissingImage => write!(f, "an image is required"),
            Self::ImageTooLarge { size, limit } => {
                write!(f, "image is {size} bytes, limit is {limit} bytes")
            }
            Self::InvalidContentId(cid) => write!(f, "invalid content identifier: {cid:?}"),
        }
    }
}

impl std::error::Error for FormError {}
