use photo_search_core::{PhotoDescriptor, SearchPage};
use serde::{Deserialize, Deserializer};

/// Every Flickr response carries `stat`; failures add `code` and `message`.
#[derive(Deserialize)]
pub(crate) struct Status {
    pub stat: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        self.stat == "ok"
    }
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    pub photos: PhotosJson,
}

#[derive(Deserialize)]
pub(crate) struct PhotosJson {
    #[serde(deserialize_with = "lenient_u32")]
    pub page: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub pages: u32,
    #[serde(default)]
    pub photo: Vec<PhotoJson>,
}

#[derive(Deserialize)]
pub(crate) struct PhotoJson {
    pub id: String,
    pub server: String,
    pub secret: String,
    #[serde(default)]
    pub title: String,
}

impl From<PhotosJson> for SearchPage {
    fn from(photos: PhotosJson) -> Self {
        Self {
            page: photos.page,
            total_pages: photos.pages,
            descriptors: photos
                .photo
                .into_iter()
                .map(|p| PhotoDescriptor::new(p.id, p.server, p.secret).with_title(p.title))
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct LocationResponse {
    pub photo: LocationPhotoJson,
}

#[derive(Deserialize)]
pub(crate) struct LocationPhotoJson {
    pub location: LocationJson,
}

/// Flickr sends coordinates as strings; some mirrors send numbers.
#[derive(Deserialize)]
pub(crate) struct LocationJson {
    pub latitude: StringOrNumber,
    pub longitude: StringOrNumber,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StringOrNumber {
    Number(f64),
    Text(String),
}

impl StringOrNumber {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) if n >= 0.0 => Ok(n as u32),
        StringOrNumber::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Err(serde::de::Error::custom(format!("negative count {n}"))),
    }
}
