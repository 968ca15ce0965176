//! Anime details page parsing.

use scraper::Html;
use serde::Serialize;

use crate::error::{ResolutionError, Result};
use crate::site::layout;
use crate::site::SourceIdentifier;

/// One row of the details page episode list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeEntry {
    pub number: u32,
    pub title: String,
}

/// Anime metadata as published by the source site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimeDetails {
    pub id: SourceIdentifier,
    pub title: String,
    pub synopsis: String,
    pub cover: String,
    pub kind: String,
    pub status: String,
    pub genres: Vec<String>,
    /// Sorted by episode number.
    pub episodes: Vec<EpisodeEntry>,
}

/// Parse a details page. Rows without a numeric episode number are dropped.
///
/// # Errors
///
/// `ParseFailed` when the page carries no anime title.
pub fn parse_details(id: &SourceIdentifier, html: &str) -> Result<AnimeDetails> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = layout::first_text(root, &layout::selector(layout::DETAILS_TITLE)?);
    if title.is_empty() {
        return Err(ResolutionError::parse_failed(format!(
            "details page for {id} has no title"
        )));
    }

    let genre_sel = layout::selector(layout::DETAILS_GENRES)?;
    let genres = document
        .select(&genre_sel)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|g| !g.is_empty())
        .collect();

    let row_sel = layout::selector(layout::DETAILS_EPISODES)?;
    let number_sel = layout::selector(layout::DETAILS_EPISODE_NUMBER)?;
    let row_title_sel = layout::selector(layout::DETAILS_EPISODE_TITLE)?;
    let mut episodes: Vec<EpisodeEntry> = document
        .select(&row_sel)
        .filter_map(|row| {
            let number = layout::leading_number(&layout::first_text(row, &number_sel))?;
            Some(EpisodeEntry {
                number,
                title: layout::first_text(row, &row_title_sel),
            })
        })
        .collect();
    episodes.sort_by_key(|e| e.number);

    Ok(AnimeDetails {
        id: id.clone(),
        title,
        synopsis: layout::first_text(root, &layout::selector(layout::DETAILS_SYNOPSIS)?),
        cover: layout::first_attr(root, &layout::selector(layout::DETAILS_COVER)?, "src")
            .map(layout::https_if_protocol_relative)
            .unwrap_or_default(),
        kind: layout::first_text(root, &layout::selector(layout::DETAILS_TYPE)?),
        status: layout::first_text(root, &layout::selector(layout::DETAILS_STATUS)?),
        genres,
        episodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const DETAILS: &str = r#"
        <html><body>
          <div class="AnimeCover"><img src="//cdn.site.test/covers/20.jpg"></div>
          <h1 class="AnimeName">Naruto</h1>
          <span class="Type tv">Anime</span>
          <p class="AnmStts"><span class="Status">Finalizado</span></p>
          <nav class="Nvgnrs"><a href="/browse?genre=accion">Acción</a><a href="/browse?genre=comedia">Comedia</a></nav>
          <div class="Description"><p> A ninja story. </p></div>
          <ul class="Episodes">
            <li><p class="Num">3</p><span class="Title">Third</span></li>
            <li><p class="Num">1</p><span class="Title">First</span></li>
            <li><p class="Num">Especial</p><span class="Title">Extra</span></li>
            <li><p class="Num">2</p><span class="Title">Second</span></li>
          </ul>
        </body></html>"#;

    #[test]
    fn parses_details_page() {
        let id = SourceIdentifier::new("naruto");
        let details = parse_details(&id, DETAILS).unwrap();

        assert_eq!(details.title, "Naruto");
        assert_eq!(details.synopsis, "A ninja story.");
        assert_eq!(details.cover, "https://cdn.site.test/covers/20.jpg");
        assert_eq!(details.kind, "Anime");
        assert_eq!(details.status, "Finalizado");
        assert_eq!(details.genres, vec!["Acción", "Comedia"]);
    }

    #[test]
    fn episodes_are_sorted_and_numeric_only() {
        let details = parse_details(&SourceIdentifier::new("naruto"), DETAILS).unwrap();
        let numbers: Vec<u32> = details.episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(details.episodes[0].title, "First");
    }

    #[test]
    fn page_without_title_is_parse_failed() {
        let err = parse_details(&SourceIdentifier::new("x"), "<html><body></body></html>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseFailed);
    }
}
