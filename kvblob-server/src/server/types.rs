use bytes::Bytes;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    pub(crate) pool_size: usize,
    pub(crate) pool_available: usize,
}

/// Query parameters accepted on `/`; which ones matter depends on the method.
///
/// Values are percent-decoded to raw bytes, so a blob need not be UTF-8.
/// When a name repeats, the first occurrence wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct BlobQuery {
    pub(crate) action: Option<Bytes>,
    pub(crate) blob: Option<Bytes>,
    pub(crate) old_blob: Option<Bytes>,
    pub(crate) new_blob: Option<Bytes>,
}

impl BlobQuery {
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        let mut query = BlobQuery::default();

        for pair in raw.unwrap_or_default().split('&') {
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));

            let slot = match &decode_component(name)[..] {
                b"action" => &mut query.action,
                b"blob" => &mut query.blob,
                b"oldBlob" => &mut query.old_blob,
                b"newBlob" => &mut query.new_blob,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(decode_component(value));
            }
        }

        query
    }
}

/// Form-style decoding: `+` is a space, `%XX` is a raw byte
fn decode_component(component: &str) -> Bytes {
    let spaced: Vec<u8> = component
        .bytes()
        .map(|byte| if byte == b'+' { b' ' } else { byte })
        .collect();
    Bytes::from(urlencoding::decode_binary(&spaced).into_owned())
}

#[derive(Debug, Serialize)]
pub(crate) struct CountResponse {
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct BlobResponse {
    pub(crate) blob: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BlobsResponse {
    pub(crate) blobs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}
