use serde::{Deserialize, Serialize};

/// Largest edge length rendered for inline icons.
pub const MAX_ICON_SIZE: u32 = 1024;

/// Raw pixel data in the layout shell clients expect for `icon-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    pub width: i32,
    pub height: i32,
    pub rowstride: i32,
    pub has_alpha: bool,
    pub bits_per_sample: i32,
    pub n_channels: i32,
    pub data: Vec<u8>,
}

impl PixelImage {
    /// A square RGBA image filled with one color.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let size = size.min(MAX_ICON_SIZE);
        let pixels = (size * size) as usize;
        let edge = size as i32;
        Self {
            width: edge,
            height: edge,
            rowstride: edge * 4,
            has_alpha: true,
            bits_per_sample: 8,
            n_channels: 4,
            data: rgba.repeat(pixels),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaIcon {
    /// Serialized icon descriptor: a themed icon name or a file URI.
    Named(String),
    Pixels(PixelImage),
}

/// Display metadata for one result. Carries exactly one icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireRecord", try_from = "WireRecord")]
pub struct MetaRecord {
    pub id: String,
    pub name: String,
    pub icon: MetaIcon,
}

type WireIconData = (i32, i32, i32, bool, i32, i32, Vec<u8>);

#[derive(Serialize, Deserialize)]
struct WireRecord {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gicon: Option<String>,
    #[serde(rename = "icon-data", default, skip_serializing_if = "Option::is_none")]
    icon_data: Option<WireIconData>,
}

impl From<MetaRecord> for WireRecord {
    fn from(record: MetaRecord) -> Self {
        let (gicon, icon_data) = match record.icon {
            MetaIcon::Named(descriptor) => (Some(descriptor), None),
            MetaIcon::Pixels(image) => (
                None,
                Some((
                    image.width,
                    image.height,
                    image.rowstride,
                    image.has_alpha,
                    image.bits_per_sample,
                    image.n_channels,
                    image.data,
                )),
            ),
        };
        Self {
            id: record.id,
            name: record.name,
            gicon,
            icon_data,
        }
    }
}

impl TryFrom<WireRecord> for MetaRecord {
    type Error = String;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let icon = match (wire.gicon, wire.icon_data) {
            (Some(descriptor), None) => MetaIcon::Named(descriptor),
            (None, Some((width, height, rowstride, has_alpha, bits_per_sample, n_channels, data))) => {
                MetaIcon::Pixels(PixelImage {
                    width,
                    height,
                    rowstride,
                    has_alpha,
                    bits_per_sample,
                    n_channels,
                    data,
                })
            }
            _ => {
                return Err(format!(
                    "record {} must carry exactly one of gicon or icon-data",
                    wire.id
                ))
            }
        };
        Ok(Self {
            id: wire.id,
            name: wire.name,
            icon,
        })
    }
}
