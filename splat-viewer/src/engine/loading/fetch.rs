use crate::viewer::ViewerError;

/// Fetch the raw bytes behind `url` with the browser's `fetch`.
#[cfg(target_arch = "wasm32")]
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ViewerError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |err: wasm_bindgen::JsValue| ViewerError::Fetch {
        url: url.to_string(),
        message: format!("{err:?}"),
    };

    let window = web_sys::window().ok_or_else(|| ViewerError::Fetch {
        url: url.to_string(),
        message: "window object not available".into(),
    })?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?
        .dyn_into()
        .map_err(fetch_error)?;

    if !response.ok() {
        return Err(ViewerError::Http {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(not(target_arch = "wasm32"))]
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Download `http(s)` URLs, read anything else as a local path.
///
/// Runs on a task pool thread, so the blocking client is fine here.
#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ViewerError> {
    if is_remote(url) {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ViewerError::Fetch {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        return download(&client, url);
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    read_path(std::path::Path::new(path))
}

#[cfg(not(target_arch = "wasm32"))]
fn download(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, ViewerError> {
    let fetch_error = |err: reqwest::Error| ViewerError::Fetch {
        url: url.to_string(),
        message: err.to_string(),
    };

    let response = client.get(url).send().map_err(fetch_error)?;
    if !response.status().is_success() {
        return Err(ViewerError::Http {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    let bytes = response.bytes().map_err(fetch_error)?;
    Ok(bytes.to_vec())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read_path(path: &std::path::Path) -> Result<Vec<u8>, ViewerError> {
    std::fs::read(path).map_err(|err| ViewerError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

pub fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Last path segment of a URL or path, used to name the loaded asset.
pub fn display_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_come_from_the_last_segment() {
        assert_eq!(display_name("https://host/splats/train.splat?x=1"), "train.splat");
        assert_eq!(display_name("C:\\data\\room.ply"), "room.ply");
        assert_eq!(display_name("scene.ply"), "scene.ply");
        assert_eq!(display_name("https://host/dir/"), "dir");
    }

    #[test]
    fn remote_detection_ignores_case() {
        assert!(is_remote("HTTPS://example.com/a.splat"));
        assert!(!is_remote("/tmp/a.splat"));
        assert!(!is_remote("file:///tmp/a.splat"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_local_files_are_io_errors() {
        let missing = bevy::tasks::block_on(fetch_bytes("/definitely/not/here.splat"));
        assert!(matches!(missing, Err(ViewerError::Io { .. })));
    }

    /// Answer a single HTTP request on a loopback port with `response`.
    #[cfg(not(target_arch = "wasm32"))]
    fn serve_once(response: &'static [u8]) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&chunk[..n]),
                }
            }
            stream.write_all(response).unwrap();
        });
        format!("http://{address}/scene.splat")
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn loopback_client() -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap()
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_success_status_becomes_http_error() {
        let url = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let err = download(&loopback_client(), &url).unwrap_err();
        assert_eq!(err, ViewerError::Http { url, status: 404 });
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn remote_bodies_are_downloaded() {
        let url = serve_once(
            b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nsplt",
        );
        assert_eq!(download(&loopback_client(), &url).unwrap(), b"splt".to_vec());
    }
}
