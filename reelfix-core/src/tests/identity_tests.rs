use super::*;

#[test]
fn imdb_hint_shape() {
    assert_eq!(IdHint::parse("tt1375666"), IdHint::Imdb("tt1375666".into()));
    assert_eq!(IdHint::parse(" tt0944947 "), IdHint::Imdb("tt0944947".into()));
}

#[test]
fn numeric_hint_is_tmdb() {
    assert_eq!(IdHint::parse("27205"), IdHint::Tmdb(27205));
}

#[test]
fn other_shapes_are_invalid() {
    assert!(matches!(IdHint::parse("tt"), IdHint::Invalid(_)));
    assert!(matches!(IdHint::parse("nm0000138"), IdHint::Invalid(_)));
    assert!(matches!(IdHint::parse("12a"), IdHint::Invalid(_)));
    assert!(matches!(IdHint::parse("0"), IdHint::Invalid(_)));
    assert!(matches!(IdHint::parse(""), IdHint::Invalid(_)));
}

#[test]
fn extracts_imdb_id_from_url() {
    let url = "https://www.imdb.com/title/tt1375666/?ref_=fn_al_tt_1";
    assert_eq!(extract_default_id(url).as_deref(), Some("tt1375666"));
}

#[test]
fn extracts_tmdb_ids_from_urls() {
    assert_eq!(
        extract_default_id("https://www.themoviedb.org/movie/27205-inception").as_deref(),
        Some("27205")
    );
    assert_eq!(
        extract_default_id("https://www.themoviedb.org/tv/1399").as_deref(),
        Some("1399")
    );
}

#[test]
fn imdb_wins_over_tmdb_in_same_text() {
    let text = "see /movie/27205 and /title/tt1375666";
    assert_eq!(extract_default_id(text).as_deref(), Some("tt1375666"));
}

#[test]
fn no_id_in_plain_name() {
    assert_eq!(extract_default_id("Inception.2010.1080p.mkv"), None);
    assert_eq!(extract_default_id("/title/ttabc"), None);
}

#[test]
fn identity_rejects_blank_title() {
    assert_eq!(
        MediaIdentity::new("  ", MediaType::Movie),
        Err(IdentityError::MissingTitle)
    );
}

#[test]
fn identity_drops_empty_hints() {
    let identity = MediaIdentity::new("Inception", MediaType::Movie)
        .unwrap()
        .with_imdb_id(Some(""))
        .with_tmdb_id(Some(0))
        .with_year(Some(0));
    assert_eq!(identity.imdb_id, None);
    assert_eq!(identity.tmdb_id, None);
    assert_eq!(identity.year, None);
}

#[test]
fn with_hint_routes_by_shape() {
    let base = MediaIdentity::new("Inception", MediaType::Movie).unwrap();
    let a = base.clone().with_hint(&IdHint::parse("tt1375666"));
    assert_eq!(a.imdb_id.as_deref(), Some("tt1375666"));
    let b = base.clone().with_hint(&IdHint::parse("27205"));
    assert_eq!(b.tmdb_id, Some(27205));
    let c = base.clone().with_hint(&IdHint::parse("bogus"));
    assert_eq!(c, base);
}
