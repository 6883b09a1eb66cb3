use chrono::{NaiveDate, NaiveDateTime};
use dcf77_web::dcf77::Dcf77Frame;
use dcf77_web::history::RingLog;
use dcf77_web::http::connection::ContentWriter;
use dcf77_web::page::{ENTRIES_PER_CHUNK, IndexPage, WallClock};

struct FixedClock;

impl WallClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        at(2024, 3, 9, 12, 34)
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn history_of<const N: usize>(count: u32) -> RingLog<N> {
    let history = RingLog::new();
    for i in 0..count {
        let time = at(2024, 3, 9, 10 + i / 60, i % 60);
        history.append(Dcf77Frame::encode(&time, false).raw());
    }
    history
}

fn entries(html: &str) -> usize {
    html.matches("<button").count()
}

fn chunk<W: ContentWriter>(page: &mut W, first: bool) -> (String, bool) {
    let mut out = Vec::new();
    let more = page.write_body_chunk(first, "/", &mut out).unwrap();
    (String::from_utf8(out).unwrap(), more)
}

#[test]
fn test_content_type_is_html() {
    let history: RingLog<4> = RingLog::new();
    let mut page = IndexPage::new(&history, FixedClock);
    let mut out = Vec::new();

    page.write_content_type("/", &mut out).unwrap();

    assert_eq!(out, b"Content-Type: text/html; charset=utf-8\r\n".to_vec());
}

#[test]
fn test_body_is_streamed_in_bounded_chunks() {
    let history: RingLog<64> = history_of(25);
    let mut page = IndexPage::new(&history, FixedClock);

    let (first, more) = chunk(&mut page, true);
    assert!(more);
    assert!(first.starts_with("<!DOCTYPE html>"));
    assert!(first.contains("09/03/2024 12:34"));
    assert_eq!(entries(&first), ENTRIES_PER_CHUNK);

    let (second, more) = chunk(&mut page, false);
    assert!(more);
    assert_eq!(entries(&second), ENTRIES_PER_CHUNK);
    assert!(!second.contains("<!DOCTYPE html>"));

    let (last, more) = chunk(&mut page, false);
    assert!(!more);
    assert_eq!(entries(&last), 5);
    assert!(last.ends_with("</html>\r\n"));
}

#[test]
fn test_exact_multiple_of_chunk_ends_without_extra_call() {
    let history: RingLog<64> = history_of(ENTRIES_PER_CHUNK as u32);
    let mut page = IndexPage::new(&history, FixedClock);

    let (body, more) = chunk(&mut page, true);

    assert!(!more);
    assert_eq!(entries(&body), ENTRIES_PER_CHUNK);
    assert!(body.ends_with("</html>\r\n"));
}

#[test]
fn test_entries_are_oldest_first_and_decoded() {
    let history: RingLog<64> = history_of(2);
    let mut page = IndexPage::new(&history, FixedClock);

    let (body, _) = chunk(&mut page, true);
    let first = body.find("09/03/2024 10:00 CEST: 0 CET: 1").unwrap();
    let second = body.find("09/03/2024 10:01 CEST: 0 CET: 1").unwrap();

    assert!(first < second);
    assert!(body.contains("Weekday: 6 Sec. antenna: 0 Summer ann.: 0 Leap ann.: 0"));
    assert!(body.contains("Weather: 0x0000"));
}

#[test]
fn test_appends_during_response_do_not_extend_it() {
    let history: RingLog<64> = history_of(15);
    let mut page = IndexPage::new(&history, FixedClock);

    let (first, _) = chunk(&mut page, true);
    for _ in 0..7 {
        history.append(Dcf77Frame::encode(&at(2024, 3, 9, 11, 0), true).raw());
    }
    let (rest, more) = chunk(&mut page, false);

    assert!(!more);
    assert_eq!(entries(&first) + entries(&rest), 15);
    assert!(!rest.contains("CEST: 1"));
}

#[test]
fn test_new_response_restarts_session() {
    let history: RingLog<64> = history_of(25);
    let mut page = IndexPage::new(&history, FixedClock);

    chunk(&mut page, true);
    let (again, more) = chunk(&mut page, true);

    assert!(more);
    assert!(again.starts_with("<!DOCTYPE html>"));
    assert!(again.contains("09/03/2024 10:00"));
}
