//! Test doubles: a one-shot HTTP stub and an in-memory holiday source.

use crate::calendar::{Holiday, HolidaySource};
use crate::error::FetchError;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// Serve a single canned response on a random local port.
///
/// Returns the URL to hit and a handle yielding the raw request head the
/// stub received.
pub fn serve_once(status: &str, content_type: &str, body: &[u8]) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{}/api", port);

    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len(),
        content_type
    );
    let body = body.to_vec();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
        stream.flush().unwrap();
        String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
}

/// URL of a local port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

/// In-memory holiday source that records every month it is asked for.
pub struct StubHolidays {
    dates: Vec<String>,
    fail: bool,
    months: RefCell<Vec<u32>>,
}

impl StubHolidays {
    pub fn none() -> StubHolidays {
        StubHolidays::with(&[])
    }

    /// Holidays given as "YYYY-MM-DD"; each month's list only returns its own dates
    pub fn with(dates: &[&str]) -> StubHolidays {
        StubHolidays {
            dates: dates.iter().map(|d| d.to_string()).collect(),
            fail: false,
            months: RefCell::new(Vec::new()),
        }
    }

    /// Every lookup fails with a transport error
    pub fn failing() -> StubHolidays {
        StubHolidays {
            fail: true,
            ..StubHolidays::none()
        }
    }

    pub fn calls(&self) -> usize {
        self.months.borrow().len()
    }

    pub fn months(&self) -> Vec<u32> {
        self.months.borrow().clone()
    }
}

impl HolidaySource for StubHolidays {
    fn holidays(&self, month: u32) -> Result<Vec<Holiday>, FetchError> {
        self.months.borrow_mut().push(month);
        if self.fail {
            return Err(FetchError::Transport {
                url: format!("http://holidays.invalid/api?month={}", month),
                message: "connection refused".to_string(),
            });
        }
        Ok(self
            .dates
            .iter()
            .filter(|d| d[5..7].parse::<u32>().ok() == Some(month))
            .map(|d| Holiday {
                date: d.clone(),
                description: None,
                is_cuti: None,
            })
            .collect())
    }
}
