use super::Input;
use anyhow::{Context, Result, bail};
use folio_config::Config;
use folio_engine::hydrate::hydrate_static_with;
use folio_engine::{Document, from_html, preview, to_html};
use std::io::Write;

pub fn parse(input: &Input, validate: bool, out: &mut dyn Write) -> Result<()> {
    let doc = from_html(&input.read_to_string()?);
    if validate {
        doc.validate().context("Parsed document breaks a composition rule")?;
    }
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

pub fn render(input: &Input, out: &mut dyn Write) -> Result<()> {
    let doc: Document =
        serde_json::from_str(&input.read_to_string()?).context("Invalid document JSON")?;
    if let Err(err) = doc.validate() {
        log::warn!("Rendering a document that breaks a composition rule: {err}");
    }
    writeln!(out, "{}", to_html(&doc))?;
    Ok(())
}

pub fn roundtrip(input: &Input, out: &mut dyn Write) -> Result<()> {
    let first = from_html(&input.read_to_string()?);
    let html = to_html(&first);
    let second = from_html(&html);
    if second != first {
        log::debug!("First pass: {first:?}");
        log::debug!("Second pass: {second:?}");
        bail!("Document changed after a parse and serialize round trip");
    }
    writeln!(out, "{html}")?;
    Ok(())
}

pub fn preview(input: &Input, length: usize, out: &mut dyn Write) -> Result<()> {
    let doc = from_html(&input.read_to_string()?);
    writeln!(out, "{}", preview::preview_blurb(&doc, length))?;
    if let Some(image) = preview::extract_first_image(&doc) {
        writeln!(out, "image: {image}")?;
    }
    Ok(())
}

pub fn to_static(input: &Input, config: &Config, out: &mut dyn Write) -> Result<()> {
    let html = input.read_to_string()?;
    writeln!(out, "{}", hydrate_static_with(&html, &config.embed.canonical_base))?;
    Ok(())
}
