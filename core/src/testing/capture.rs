use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl Captured {
    pub fn into_string_lossy(self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Reads `reader` to EOF, keeping at most `max_bytes`.
///
/// The rest is still drained so a chatty child never blocks on a full pipe.
pub async fn read_capped<R>(reader: &mut R, max_bytes: usize) -> std::io::Result<Captured>
where
    R: AsyncRead + Unpin,
{
    let mut out = Captured::default();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let room = max_bytes.saturating_sub(out.bytes.len());
        if n > room {
            out.truncated = true;
        }
        out.bytes.extend_from_slice(&buf[..n.min(room)]);
    }
    Ok(out)
}
