use mockito::{Matcher, Server};
use plancal_core::PlancalError;
use plancal_core::fetch::{HttpScheduleSource, ScheduleSource};

#[test]
fn test_fetch_sends_timetable_query() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("typ".into(), "G".into()),
            Matcher::UrlEncoded("id".into(), "186711".into()),
            Matcher::UrlEncoded("okres".into(), "3".into()),
        ]))
        .with_status(200)
        .with_body("<table><tr><td>Język</td></tr></table>")
        .create();

    let source = HttpScheduleSource::new(&format!("{}/index.php", server.url()), 3, None).unwrap();
    let body = source.fetch("186711").unwrap();

    assert_eq!(body, "<table><tr><td>Język</td></tr></table>");
    mock.assert();
}

#[test]
fn test_fetch_decodes_utf8_regardless_of_declared_charset() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "text/html; charset=iso-8859-2")
        .with_body("Ćwiczenia, żółć")
        .create();

    let source = HttpScheduleSource::new(&format!("{}/index.php", server.url()), 3, None).unwrap();

    assert_eq!(source.fetch("1").unwrap(), "Ćwiczenia, żółć");
}

#[test]
fn test_fetch_server_error_is_network_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("GET", "/index.php")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();

    let source = HttpScheduleSource::new(&format!("{}/index.php", server.url()), 3, None).unwrap();
    let err = source.fetch("42").unwrap_err();

    assert!(matches!(err, PlancalError::Network { ref id, .. } if id == "42"), "{err}");
}

#[test]
fn test_fetch_unreachable_host_is_network_error() {
    let source = HttpScheduleSource::new("http://127.0.0.1:1/index.php", 3, None).unwrap();

    assert!(matches!(source.fetch("42"), Err(PlancalError::Network { .. })));
}
