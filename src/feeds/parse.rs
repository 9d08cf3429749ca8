// src/feeds/parse.rs
//! Feed document parsing. RSS 2.0 (`<rss><channel><item>`) is tried first,
//! then Atom (`<feed><entry>`), both via quick-xml serde derives.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// One candidate item before it becomes an `Article`. Items without a
/// resolvable permalink are dropped by the fetcher, not here.
#[derive(Debug, Clone)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<TextNode>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
}

/// Atom text constructs carry a `type` attribute, so the text body has to be
/// addressed explicitly.
#[derive(Debug, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

/// Parse a feed document into candidate items, in document order.
///
/// Dispatches on the root element: `<rss>` → RSS 2.0, `<feed>` → Atom. A
/// missing or unrecognized root is a parse failure, not an empty feed.
pub fn parse_feed(xml: &str) -> Result<Vec<RawItem>> {
    match root_element(xml).as_deref() {
        Some("rss") => {
            let rss: Rss = from_str(xml).context("parsing rss 2.0 feed")?;
            Ok(rss.channel.items.into_iter().map(rss_item).collect())
        }
        Some("feed") => {
            let feed: AtomFeed = from_str(xml).context("parsing atom feed")?;
            Ok(feed.entries.into_iter().map(atom_entry).collect())
        }
        other => anyhow::bail!("unrecognized feed root element {other:?}"),
    }
}

fn root_element(xml: &str) -> Option<String> {
    use quick_xml::events::Event;
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn rss_item(it: Item) -> RawItem {
    RawItem {
        title: it.title,
        link: it.link,
        published: it.pub_date.as_deref().and_then(parse_rfc2822),
        description: it.description,
    }
}

fn atom_entry(en: Entry) -> RawItem {
    // Prefer rel="alternate" (or no rel), fall back to the first href.
    let link = en
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .and_then(|l| l.href.clone())
        .or_else(|| en.links.iter().find_map(|l| l.href.clone()));
    let published = en
        .published
        .as_deref()
        .or(en.updated.as_deref())
        .and_then(parse_rfc3339);
    let description = en
        .summary
        .and_then(|t| t.value)
        .or_else(|| en.content.and_then(|t| t.value));
    RawItem {
        title: en.title.and_then(|t| t.value),
        link,
        published,
        description,
    }
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822).ok().and_then(to_chrono)
}

fn parse_rfc3339(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc3339).ok().and_then(to_chrono)
}

fn to_chrono(dt: OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), 0)
}
