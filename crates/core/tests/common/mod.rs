//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photokit_core::ImageProcessor;
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread;

/// An image with enough detail that JPEG quality visibly changes its size.
pub fn patterned_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 7) ^ (y * 13)) as u8,
            (x.wrapping_mul(y)) as u8,
            ((x + y) * 3) as u8,
        ])
    }))
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    ImageProcessor::encode_jpeg(&patterned_image(width, height), 90).unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    patterned_image(width, height)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// Serves a single HTTP response on a local port and returns the URL to hit.
pub fn serve_once(status_line: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let Ok((mut stream, _)) = listener.accept() else {
            return;
        };

        // Drain the request head before answering.
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }

        let head = format!(
            "HTTP/1.1 {}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            body.len()
        );
        let _ = stream.write_all(head.as_bytes());
        let _ = stream.write_all(&body);
        let _ = stream.flush();
    });

    format!("http://{}/image.jpg", addr)
}

/// A URL nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/image.jpg";
