use reelfix_core::*;

fn parsed(title: Option<&str>, resolution: Option<&str>) -> ParsedName {
    ParsedName {
        title: title.map(String::from),
        resolution: resolution.map(String::from),
        ..ParsedName::default()
    }
}

#[test]
fn movie_request_from_title_and_year() {
    let mut p = parsed(Some("Inception"), Some("1080p"));
    p.year = Some(2010);
    let req = p.into_request().unwrap();
    assert_eq!(req.identity.media_type, MediaType::Movie);
    assert_eq!(req.identity.year, Some(2010));
    assert_eq!(req.episode, None);
}

#[test]
fn episode_request_from_season_and_episode() {
    let mut p = parsed(Some("Game of Thrones"), Some("720p"));
    p.season = Some(NumberOrList::Number(1));
    p.episode = Some(NumberOrList::Number(9));
    let req = p.into_request().unwrap();
    assert_eq!(req.identity.media_type, MediaType::Tv);
    assert_eq!(req.episode, Some((1, 9)));
}

#[test]
fn list_valued_episode_is_ambiguous() {
    let mut p = parsed(Some("Show"), Some("720p"));
    p.season = Some(NumberOrList::Number(1));
    p.episode = Some(NumberOrList::List(vec![1, 2]));
    assert_eq!(p.into_request(), Err(ParsedNameError::Ambiguous("episode")));
}

#[test]
fn season_without_episode_is_rejected() {
    let mut p = parsed(Some("Show"), Some("720p"));
    p.season = Some(NumberOrList::Number(3));
    assert_eq!(p.into_request(), Err(ParsedNameError::MissingEpisode(3)));
}

#[test]
fn missing_resolution_or_title_is_rejected() {
    assert_eq!(
        parsed(Some("Inception"), None).into_request(),
        Err(ParsedNameError::MissingResolution)
    );
    assert_eq!(
        parsed(None, Some("2160p")).into_request(),
        Err(ParsedNameError::MissingTitle)
    );
}

#[test]
fn deserializes_parser_output() {
    let json = r#"{"title":"Show","season":[1,2],"episode":4,"resolution":"1080p"}"#;
    let p: ParsedName = serde_json::from_str(json).unwrap();
    assert_eq!(p.season, Some(NumberOrList::List(vec![1, 2])));
    assert_eq!(p.into_request(), Err(ParsedNameError::Ambiguous("season")));
}
