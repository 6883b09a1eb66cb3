//! HTML status page listing the received time telegrams.
//!
//! [`IndexPage`] is the [`ContentWriter`] the binary plugs into the engine.
//! Every response runs one iteration session over the history; each body
//! call renders at most [`ENTRIES_PER_CHUNK`] telegrams so the engine's tick
//! stays short even with a full day of samples.

use std::io::{self, Write};

use chrono::{Local, NaiveDateTime};

use crate::dcf77::Dcf77Frame;
use crate::history::{Cursor, Event, RingLog};
use crate::http::connection::ContentWriter;
use crate::http::writer;

pub const ENTRIES_PER_CHUNK: usize = 10;

const PAGE_START: &str = "<!DOCTYPE html>\n<html><head><title>DCF77 clock receiver</title>\
<style>.collapsible { background-color: #eee; color: #444; cursor: pointer; padding: 18px; width: 100%; border: none; text-align: left; outline: none; }\n\
.active, .collapsible:hover { background-color: #ccc; }\n\
.content { padding: 0 18px; display: none; overflow: hidden; background-color: #f1f1f1; }</style>\
</head><body><h1>DCF77 clock receiver</h1><h2>Current time</h2><p>";

const PAGE_HISTORY: &str = "</p><h2>Times received from DCF77</h2>";

const PAGE_END: &str = "<script type='text/javascript'>\
for (const button of document.getElementsByClassName('collapsible')) {\
 button.addEventListener('click', function () {\
 this.classList.toggle('active');\
 const content = this.nextElementSibling;\
 content.style.display = content.style.display === 'block' ? 'none' : 'block';\
 });\
}</script></body></html>\r\n";

/// Source of the local wall-clock time shown at the top of the page.
pub trait WallClock {
    fn now(&self) -> NaiveDateTime;
}

/// System local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl WallClock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Renders the history page, one chunk per call.
#[derive(Debug)]
pub struct IndexPage<'a, const N: usize, C> {
    history: &'a RingLog<N>,
    clock: C,
    cursor: Option<Cursor<'a, N>>,
}

impl<'a, const N: usize, C: WallClock> IndexPage<'a, N, C> {
    pub fn new(history: &'a RingLog<N>, clock: C) -> Self {
        Self {
            history,
            clock,
            cursor: None,
        }
    }

    fn write_header_section(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(PAGE_START.as_bytes())?;
        write!(out, "{}", self.clock.now().format("%d/%m/%Y %H:%M"))?;
        out.write_all(PAGE_HISTORY.as_bytes())
    }
}

impl<const N: usize, C: WallClock> ContentWriter for IndexPage<'_, N, C> {
    fn write_content_type(&mut self, _path: &str, out: &mut dyn Write) -> io::Result<()> {
        writer::write_header(out, "Content-Type", "text/html; charset=utf-8")
    }

    fn write_body_chunk(
        &mut self,
        first: bool,
        _path: &str,
        out: &mut dyn Write,
    ) -> io::Result<bool> {
        if first || self.cursor.is_none() {
            self.cursor = Some(self.history.begin_iteration());
            self.write_header_section(out)?;
        }

        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(false);
        };
        for event in cursor.by_ref().take(ENTRIES_PER_CHUNK) {
            write_entry(out, event)?;
        }

        if cursor.remaining() > 0 {
            return Ok(true);
        }

        self.cursor = None;
        out.write_all(PAGE_END.as_bytes())?;
        Ok(false)
    }
}

/// One telegram: a button with the headline, and a hidden block with the
/// remaining flags.
fn write_entry(out: &mut dyn Write, event: Event) -> io::Result<()> {
    let frame = Dcf77Frame::from_event(event);
    write!(
        out,
        "<button type='button' class='collapsible'>0x{:016X} {:02}/{:02}/{:04} {:02}:{:02} CEST: {} CET: {}</button>",
        frame.raw(),
        frame.day(),
        frame.month(),
        frame.year(),
        frame.hour(),
        frame.minute(),
        u8::from(frame.cest()),
        u8::from(frame.cet()),
    )?;
    write!(
        out,
        "<div class='content'><p>Weekday: {} Sec. antenna: {} Summer ann.: {} Leap ann.: {} Parity (min, hr, dt): {} {} {} Weather: 0x{:04X}</p></div>",
        frame.weekday(),
        u8::from(frame.call_bit()),
        u8::from(frame.summer_announced()),
        u8::from(frame.leap_announced()),
        u8::from(frame.minute_parity()),
        u8::from(frame.hour_parity()),
        u8::from(frame.date_parity()),
        frame.weather(),
    )
}
