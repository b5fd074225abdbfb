//! Random payloads through every decoder.
//!
//! Whatever the bytes, a decoder returns `Ok` or `Err`; it never panics and
//! never reads past the payload.

use chaos_hostat::{decode, DisplayMode, Renderer, Service};
use rand::Rng;

const SERVICES: &[&str] = &[
    "STATUS",
    "TIME",
    "UPTIME",
    "DUMP-ROUTING-TABLE",
    "LASTCN",
    "FINGER",
    "LOAD",
    "NAME",
];

fn random_payload(rng: &mut impl Rng, max: usize) -> Vec<u8> {
    let len = rng.random_range(0..=max);
    (0..len).map(|_| rng.random()).collect()
}

#[test]
fn fuzz_all_decoders() {
    let mut rng = rand::rng();
    for _ in 0..2000 {
        let payload = random_payload(&mut rng, 488);
        for name in SERVICES {
            let service = Service::from_name(name);
            for mode in [DisplayMode::Decoded, DisplayMode::Ascii, DisplayMode::Raw] {
                if let Ok(record) = decode(&service, mode, &payload) {
                    let _ = Renderer::new(0o401, "fuzz", true).render(&record);
                }
            }
        }
    }
}

#[test]
fn fuzz_status_with_valid_prefix() {
    let mut rng = rand::rng();
    for _ in 0..1000 {
        let mut payload = vec![b' '; 32];
        payload.extend(random_payload(&mut rng, 120));
        let _ = decode(&Service::Status, DisplayMode::Decoded, &payload);
    }
}

#[test]
fn fuzz_lastcn_word_counts() {
    let mut rng = rand::rng();
    for _ in 0..1000 {
        let mut payload = Vec::new();
        for _ in 0..rng.random_range(0..6) {
            let wpe: u16 = rng.random_range(0..12);
            payload.extend_from_slice(&wpe.to_le_bytes());
            for _ in 0..rng.random_range(0..12) {
                payload.extend_from_slice(&rng.random::<u16>().to_le_bytes());
            }
        }
        let _ = decode(&Service::LastCn, DisplayMode::Decoded, &payload);
    }
}

#[test]
fn fuzz_time_lengths() {
    let mut rng = rand::rng();
    for _ in 0..500 {
        let payload = random_payload(&mut rng, 8);
        let result = decode(&Service::Time, DisplayMode::Decoded, &payload);
        if payload.len() != 4 {
            assert!(result.is_err());
        }
    }
}
