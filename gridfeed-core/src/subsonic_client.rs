use serde::Deserialize;

const API_VERSION: &str = "1.16.1";
const CLIENT_NAME: &str = "gridfeed";

/// A client for paging album lists out of Subsonic-compatible servers (Navidrome, etc).
pub struct SubsonicClient {
    server_url: String,
    username: String,
    password: String,
    http: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum SubsonicClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error (code {code}): {message}")]
    Server { code: u32, message: String },
    #[error("unexpected response format")]
    Parse,
}

// -- Response envelope types --

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    #[serde(rename = "subsonic-response")]
    subsonic_response: ResponseInner,
}

#[derive(Debug, Deserialize)]
struct ResponseInner {
    status: String,
    #[allow(dead_code)]
    version: Option<String>,
    #[serde(flatten)]
    data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientArtistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientAlbum {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(rename = "artistId", default)]
    pub artist_id: Option<String>,
    /// OpenSubsonic multi-artist list; preferred over `artist` when present
    #[serde(default)]
    pub artists: Option<Vec<ClientArtistRef>>,
    #[serde(rename = "songCount", default)]
    pub song_count: u32,
    pub year: Option<i32>,
    #[serde(rename = "coverArt")]
    pub cover_art: Option<String>,
}

/// Ordering of a `getAlbumList2` listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumListType {
    Newest,
    Recent,
    Frequent,
    Random,
    AlphabeticalByName,
    AlphabeticalByArtist,
    Starred,
}

impl AlbumListType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlbumListType::Newest => "newest",
            AlbumListType::Recent => "recent",
            AlbumListType::Frequent => "frequent",
            AlbumListType::Random => "random",
            AlbumListType::AlphabeticalByName => "alphabeticalByName",
            AlbumListType::AlphabeticalByArtist => "alphabeticalByArtist",
            AlbumListType::Starred => "starred",
        }
    }
}

impl SubsonicClient {
    pub fn new(server_url: String, username: String, password: String) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            username,
            password,
            http: reqwest::Client::new(),
        }
    }

    /// GET request for a REST method, signed with a fresh salt.
    fn get(&self, method: &str) -> reqwest::RequestBuilder {
        let salt = random_salt();
        let token = md5_hex(&format!("{}{}", self.password, salt));
        self.http
            .get(format!("{}/rest/{}", self.server_url, method))
            .query(&[
                ("u", self.username.as_str()),
                ("t", token.as_str()),
                ("s", salt.as_str()),
                ("v", API_VERSION),
                ("c", CLIENT_NAME),
                ("f", "json"),
            ])
    }

    fn album_list_request(
        &self,
        list_type: AlbumListType,
        size: u32,
        offset: u32,
    ) -> reqwest::RequestBuilder {
        self.get("getAlbumList2").query(&[
            ("type", list_type.as_str().to_string()),
            ("size", size.to_string()),
            ("offset", offset.to_string()),
        ])
    }

    /// Send a request and unwrap the `subsonic-response` envelope.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, SubsonicClientError> {
        let resp = request.send().await?.error_for_status()?;
        let envelope: ResponseEnvelope = resp.json().await?;
        unwrap_envelope(envelope)
    }

    pub async fn ping(&self) -> Result<(), SubsonicClientError> {
        self.send(self.get("ping")).await?;
        Ok(())
    }

    /// One page of `getAlbumList2`: up to `size` albums starting at `offset`.
    pub async fn get_album_list(
        &self,
        list_type: AlbumListType,
        size: u32,
        offset: u32,
    ) -> Result<Vec<ClientAlbum>, SubsonicClientError> {
        let data = self
            .send(self.album_list_request(list_type, size, offset))
            .await?;
        parse_album_list(&data)
    }
}

fn unwrap_envelope(envelope: ResponseEnvelope) -> Result<serde_json::Value, SubsonicClientError> {
    let inner = envelope.subsonic_response;

    if inner.status != "ok" {
        let error = inner.data.get("error");
        let code = error
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .unwrap_or(0) as u32;
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        return Err(SubsonicClientError::Server { code, message });
    }

    Ok(inner.data)
}

/// Extract albums from a `getAlbumList2` payload.
///
/// Some servers answer under "albumList" instead of "albumList2", and may omit the
/// "album" key entirely when the page is empty.
fn parse_album_list(data: &serde_json::Value) -> Result<Vec<ClientAlbum>, SubsonicClientError> {
    let album_arr = data
        .get("albumList2")
        .or_else(|| data.get("albumList"))
        .and_then(|al| al.get("album"))
        .and_then(|a| a.as_array());

    match album_arr {
        Some(arr) => arr
            .iter()
            .map(|v| serde_json::from_value(v.clone()).map_err(|_| SubsonicClientError::Parse))
            .collect(),
        None => Ok(Vec::new()),
    }
}

fn md5_hex(input: &str) -> String {
    use md5::Digest;
    hex::encode(md5::Md5::digest(input.as_bytes()))
}

fn random_salt() -> String {
    use rand::distr::Alphanumeric;
    use rand::Rng;
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
