use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub uri: String,
    pub name: String,
    /// Serialized icon descriptor, if the bookmark has one.
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub name: String,
    pub root_uri: String,
    /// Hidden behind another mount of the same location.
    pub shadowed: bool,
    /// Whether the mount belongs to a volume.
    pub has_volume: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    pub name: String,
    pub has_drive: bool,
    pub mount: Option<Mount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drive {
    pub name: String,
    pub volumes: Vec<Volume>,
}

/// Attributes fetched for a result URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub uri: String,
    pub display_name: String,
    pub icon: Option<String>,
    pub thumbnail_path: Option<PathBuf>,
}
