//! XML bucket/blob listings (Google Cloud Storage, Azure Blob Storage).

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::downloader::{Fetch, fetch_text};
use crate::drivers::RawEntry;
use crate::error::DriverError;

/// Fetches `url` and returns the text of every `<tag>` element as a key entry.
pub async fn fetch_xml_keys(
    fetcher: &dyn Fetch,
    url: &str,
    tag: &str,
) -> Result<Vec<RawEntry>, DriverError> {
    let body = fetch_text(fetcher, url).await?;
    let keys = element_texts(&body, tag).map_err(|reason| DriverError::ListingParseError {
        url: url.to_string(),
        reason,
    })?;
    Ok(keys.into_iter().map(RawEntry::key).collect())
}

/// Text content of every element whose local name is `tag`, namespaces ignored.
pub fn element_texts(xml: &str, tag: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut texts = Vec::new();
    let mut inside = false;
    let mut current = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == tag.as_bytes() => {
                inside = true;
                current.clear();
            }
            Ok(Event::Text(e)) if inside => {
                let text = e.unescape().map_err(|e| e.to_string())?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) if inside && e.local_name().as_ref() == tag.as_bytes() => {
                inside = false;
                texts.push(std::mem::take(&mut current));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                ));
            }
        }
    }
    Ok(texts)
}
