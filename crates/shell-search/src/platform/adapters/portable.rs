use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::{RwLock, RwLockReadGuard};
use std::time::SystemTime;

use async_trait::async_trait;
use md5::{Digest, Md5};
use url::Url;

use super::{AttributeResolver, BookmarkList, Launcher, VolumeMonitor};
use crate::error::{ProviderError, ProviderResult};
use crate::metas::PixelImage;
use crate::platform::types::{Bookmark, FileInfo, Mount};

const GENERIC_ICON_RGBA: [u8; 4] = [0x9a, 0x99, 0x96, 0xff];
const USER_MOUNT_PREFIXES: [&str; 3] = ["/media/", "/run/media/", "/mnt/"];

/// Bookmarks from the GTK bookmarks file, reloaded when the file changes.
#[derive(Debug, Default)]
pub struct GtkBookmarks {
    path: Option<PathBuf>,
    snapshot: RwLock<BookmarkSnapshot>,
}

#[derive(Debug, Default)]
struct BookmarkSnapshot {
    stamp: Option<FileStamp>,
    items: Vec<Bookmark>,
}

/// Modification time and length of the bookmarks file when it was parsed.
type FileStamp = (Option<SystemTime>, u64);

impl GtkBookmarks {
    /// A fixed list with no backing file.
    pub fn new(items: Vec<Bookmark>) -> Self {
        Self {
            path: None,
            snapshot: RwLock::new(BookmarkSnapshot { stamp: None, items }),
        }
    }

    /// Loads `$XDG_CONFIG_HOME/gtk-3.0/bookmarks`. A missing file yields an
    /// empty list.
    pub fn load_default() -> Self {
        match dirs::config_dir() {
            Some(dir) => Self::load(&dir.join("gtk-3.0").join("bookmarks")),
            None => Self::default(),
        }
    }

    pub fn load(path: &Path) -> Self {
        let list = Self {
            path: Some(path.to_path_buf()),
            snapshot: RwLock::default(),
        };
        list.refresh();
        list
    }

    fn read(&self) -> RwLockReadGuard<'_, BookmarkSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn file_stamp(path: &Path) -> Option<FileStamp> {
    let metadata = fs::metadata(path).ok()?;
    Some((metadata.modified().ok(), metadata.len()))
}

impl BookmarkList for GtkBookmarks {
    fn refresh(&self) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        let stamp = file_stamp(path);
        if stamp.is_some() && self.read().stamp == stamp {
            return;
        }

        let items = match fs::read_to_string(path) {
            Ok(text) => parse_bookmarks(&text),
            Err(error) => {
                tracing::debug!("no bookmarks at {}: {error}", path.display());
                Vec::new()
            }
        };
        tracing::debug!(count = items.len(), "bookmarks loaded");
        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *snapshot = BookmarkSnapshot { stamp, items };
    }

    fn len(&self) -> usize {
        self.read().items.len()
    }

    fn item_at(&self, index: usize) -> Option<Bookmark> {
        self.read().items.get(index).cloned()
    }

    fn item_with_uri(&self, uri: &str) -> Option<Bookmark> {
        self.read().items.iter().find(|item| item.uri == uri).cloned()
    }
}

/// Parses lines of the form `URI [label]`.
pub fn parse_bookmarks(text: &str) -> Vec<Bookmark> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let (uri, label) = match line.split_once(' ') {
                Some((uri, label)) => (uri, Some(label.trim())),
                None => (line, None),
            };
            let parsed = Url::parse(uri).ok()?;
            let name = label
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_bookmark_name(&parsed));
            let icon = if parsed.scheme() == "file" {
                "folder"
            } else {
                "folder-remote"
            };
            Some(Bookmark {
                uri: uri.to_string(),
                name,
                icon: Some(icon.to_string()),
            })
        })
        .collect()
}

fn default_bookmark_name(uri: &Url) -> String {
    if let Ok(path) = uri.to_file_path() {
        if let Some(name) = path.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }
    uri.host_str().unwrap_or(uri.as_str()).to_string()
}

/// User-visible mounts from `/proc/self/mounts`.
#[derive(Debug, Clone)]
pub struct ProcMounts {
    table: PathBuf,
}

impl Default for ProcMounts {
    fn default() -> Self {
        Self {
            table: PathBuf::from("/proc/self/mounts"),
        }
    }
}

impl ProcMounts {
    pub fn with_table(table: PathBuf) -> Self {
        Self { table }
    }
}

impl VolumeMonitor for ProcMounts {
    fn mounts(&self) -> Vec<Mount> {
        match fs::read_to_string(&self.table) {
            Ok(text) => parse_mounts(&text),
            Err(error) => {
                tracing::debug!("cannot read {}: {error}", self.table.display());
                Vec::new()
            }
        }
    }
}

/// Parses a mount table and keeps removable and user mounts.
pub fn parse_mounts(text: &str) -> Vec<Mount> {
    text.lines()
        .filter_map(|line| {
            let mount_point = unescape_mount_field(line.split_whitespace().nth(1)?);
            if !USER_MOUNT_PREFIXES
                .iter()
                .any(|prefix| mount_point.starts_with(prefix))
            {
                return None;
            }
            let path = PathBuf::from(&mount_point);
            let root_uri = Url::from_directory_path(&path).ok()?.to_string();
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| mount_point.clone());
            Some(Mount {
                name,
                root_uri,
                shadowed: false,
                has_volume: false,
            })
        })
        .collect()
}

/// Decodes the octal escapes (`\040` and friends) used in mount tables.
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'\\' && index + 4 <= bytes.len() {
            let digits = &bytes[index + 1..index + 4];
            if digits.iter().all(|digit| (b'0'..=b'7').contains(digit)) {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, digit| acc * 8 + u32::from(digit - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    index += 4;
                    continue;
                }
            }
        }
        out.push(bytes[index]);
        index += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

const THUMBNAIL_SIZES: [&str; 2] = ["large", "normal"];

/// Attributes from local filesystem metadata, with thumbnails from the
/// shared freedesktop thumbnail cache.
#[derive(Debug, Clone)]
pub struct FsAttributeResolver {
    thumbnail_root: Option<PathBuf>,
}

impl Default for FsAttributeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FsAttributeResolver {
    /// Reads thumbnails from `$XDG_CACHE_HOME/thumbnails`.
    pub fn new() -> Self {
        Self {
            thumbnail_root: dirs::cache_dir().map(|dir| dir.join("thumbnails")),
        }
    }

    pub fn with_thumbnail_root(root: PathBuf) -> Self {
        Self {
            thumbnail_root: Some(root),
        }
    }

    async fn find_thumbnail(&self, uri: &str) -> Option<PathBuf> {
        let root = self.thumbnail_root.as_deref()?;
        let name = thumbnail_file_name(uri);
        for size in THUMBNAIL_SIZES {
            let candidate = root.join(size).join(&name);
            if tokio::fs::metadata(&candidate)
                .await
                .is_ok_and(|metadata| metadata.is_file())
            {
                return Some(candidate);
            }
        }
        None
    }
}

/// `<md5 of the URI>.png`, the cache key used by freedesktop thumbnailers.
fn thumbnail_file_name(uri: &str) -> String {
    format!("{:x}.png", Md5::digest(uri.as_bytes()))
}

#[async_trait]
impl AttributeResolver for FsAttributeResolver {
    async fn fetch_attributes(&self, uris: Vec<String>) -> Vec<FileInfo> {
        let mut infos = Vec::with_capacity(uris.len());
        for uri in uris {
            let Some((canonical, path)) = Url::parse(&uri).ok().and_then(|parsed| {
                let path = parsed.to_file_path().ok()?;
                Some((parsed.to_string(), path))
            }) else {
                tracing::debug!(uri = %uri, "not a local file");
                continue;
            };
            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(error) => {
                    tracing::debug!(uri = %uri, "no attributes: {error}");
                    continue;
                }
            };
            let display_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let thumbnail_path = if metadata.is_dir() {
                None
            } else {
                self.find_thumbnail(&canonical).await
            };
            infos.push(FileInfo {
                icon: themed_icon_name(&path, metadata.is_dir()).map(str::to_string),
                uri,
                display_name,
                thumbnail_path,
            });
        }
        infos
    }

    fn render_generic_icon(&self, _info: &FileInfo, size: u32) -> PixelImage {
        PixelImage::solid(size, GENERIC_ICON_RGBA)
    }
}

fn themed_icon_name(path: &Path, is_dir: bool) -> Option<&'static str> {
    if is_dir {
        return Some("folder");
    }
    let extension = path.extension()?.to_string_lossy().to_ascii_lowercase();
    let name = match extension.as_str() {
        "txt" | "md" | "rst" | "log" => "text-x-generic",
        "pdf" => "application-pdf",
        "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => "image-x-generic",
        "mp3" | "ogg" | "flac" | "wav" => "audio-x-generic",
        "mp4" | "mkv" | "webm" | "avi" => "video-x-generic",
        "zip" | "tar" | "gz" | "xz" | "7z" => "package-x-generic",
        _ => return None,
    };
    Some(name)
}

/// Opens URIs with the desktop's default handler.
#[derive(Debug, Default, Clone)]
pub struct XdgLauncher;

impl XdgLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for XdgLauncher {
    fn open_uri(&self, uri: &str) -> ProviderResult<()> {
        open_uri_native(uri)
    }
}

fn ensure_command_success(status: ExitStatus, command_label: &str) -> ProviderResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(ProviderError::collaborator(
            "launcher",
            format!("{command_label} failed with status {status}"),
        ))
    }
}

#[cfg(target_os = "macos")]
fn open_uri_native(uri: &str) -> ProviderResult<()> {
    let status = Command::new("open").arg(uri).status().map_err(|error| {
        ProviderError::collaborator("launcher", format!("failed to run open: {error}"))
    })?;
    ensure_command_success(status, "open")
}

#[cfg(not(target_os = "macos"))]
fn open_uri_native(uri: &str) -> ProviderResult<()> {
    let status = Command::new("xdg-open").arg(uri).status().map_err(|error| {
        ProviderError::collaborator("launcher", format!("failed to run xdg-open: {error}"))
    })?;
    ensure_command_success(status, "xdg-open")
}
