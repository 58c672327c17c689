use anyhow::Context as _;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

pub(crate) fn read_str(name: &str) -> anyhow::Result<String> {
    let file = Asset::get(name).with_context(|| format!("Missing embedded asset '{}'", name))?;
    let s = std::str::from_utf8(file.data.as_ref())
        .with_context(|| format!("Embedded asset '{}' is not UTF-8", name))?;
    Ok(s.to_owned())
}
