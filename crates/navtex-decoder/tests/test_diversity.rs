mod common;

use crossbeam_channel::unbounded;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use navtex_config::SharedConfig;
use navtex_core::ccir476::encode;
use navtex_core::{BitSourceErr, CodeWord, Glyph};
use navtex_decoder::{ChunkedBitSource, Session, SessionErr};
use common::{decode_bits, diversity_groups, encode_text, groups_to_bits, preamble, test_config};

const MESSAGE: &str = "ZCZC FA01\nGALE WARNING 7 NR 123/4\nNNNN\n";

fn message_chars() -> Vec<CodeWord> {
    let mut chars = preamble();
    chars.extend(encode_text(MESSAGE));
    let ltrs = encode(Glyph::Letters).unwrap();
    chars.extend([ltrs, ltrs]);
    chars
}

/// Flip one bit in at most one of the two copies of each character.
/// Groups inside the first sync window and the unrepeated tail are left alone.
fn corrupt_one_copy(chars: &[CodeWord], rng: &mut StdRng) -> (Vec<CodeWord>, usize) {
    let mut groups = diversity_groups(chars);
    let mut flipped = 0;
    for k in 0..chars.len() - 2 {
        // DX copy at 2k, RX copy at 2k + 5
        let copies: Vec<usize> = [2 * k, 2 * k + 5].into_iter().filter(|&i| i >= 10 && i < groups.len()).collect();
        if copies.is_empty() || !rng.random_bool(0.6) {
            continue;
        }
        let i = copies[rng.random_range(0..copies.len())];
        let bit: u32 = rng.random_range(0..7);
        let raw = groups[i].into_raw() ^ (1u8 << bit);
        groups[i] = CodeWord::from_raw(raw);
        flipped += 1;
    }
    (groups, flipped)
}

#[test]
fn test_single_copy_errors_fully_corrected() {
    let chars = message_chars();
    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (groups, flipped) = corrupt_one_copy(&chars, &mut rng);

        let d = decode_bits(&groups_to_bits(&groups));
        assert_eq!(d.text, MESSAGE, "seed {}", seed);
        assert_eq!(d.stats.recovered, flipped as u64, "seed {}", seed);
        assert_eq!(d.stats.syncs, 1);
        assert_eq!(d.stats.sync_losses, 0);
    }
}

#[test]
fn test_chunked_delivery_matches_file_decode() {
    let bits = groups_to_bits(&diversity_groups(&message_chars()));
    let mut rng = StdRng::seed_from_u64(476);

    let (tx, rx) = unbounded();
    let mut rest = bits.as_slice();
    while !rest.is_empty() {
        // Empty datagrams must not end the stream
        if rng.random_bool(0.2) {
            tx.send(Ok(vec![])).unwrap();
        }
        let n = rng.random_range(1..=50usize).min(rest.len());
        tx.send(Ok(rest[..n].to_vec())).unwrap();
        rest = &rest[n..];
    }
    drop(tx);

    let config = SharedConfig::from_config(test_config()).unwrap();
    let mut session = Session::new(config, ChunkedBitSource::new(rx), Vec::new());
    let stats = session.run().unwrap();
    assert_eq!(stats.bits, bits.len() as u64);
    assert_eq!(String::from_utf8(session.into_output()).unwrap(), MESSAGE);
    assert_eq!(decode_bits(&bits).text, MESSAGE);
}

#[test]
fn test_receiver_failure_ends_session_with_error() {
    let bits = groups_to_bits(&diversity_groups(&message_chars()));
    let (tx, rx) = unbounded();
    tx.send(Ok(bits[..200].to_vec())).unwrap();
    tx.send(Err(BitSourceErr::Io("multicast receive failed".to_string()))).unwrap();
    drop(tx);

    let config = SharedConfig::from_config(test_config()).unwrap();
    let mut session = Session::new(config, ChunkedBitSource::new(rx), Vec::new());
    match session.run() {
        Err(SessionErr::Source(msg)) => assert!(msg.contains("multicast receive failed")),
        other => panic!("expected source error, got {:?}", other),
    }
    assert_eq!(session.stats().syncs, 1);
}

#[test]
fn test_random_noise_terminates() {
    let mut rng = StdRng::seed_from_u64(100);
    let mut bits: Vec<u8> = (0..20_000).map(|_| rng.random_bool(0.5) as u8).collect();
    // Message buried in noise, with a few flipped bits anywhere after the first window
    let clean = groups_to_bits(&diversity_groups(&message_chars()));
    let start = bits.len();
    bits.extend(&clean);
    for _ in 0..10 {
        let i = start + rng.random_range(70..clean.len());
        bits[i] ^= 1;
    }
    bits.extend((0..3_000).map(|_| rng.random_bool(0.5) as u8));

    let d = decode_bits(&bits);
    // A trailing partial group is not counted
    assert!(d.stats.bits <= bits.len() as u64 && d.stats.bits + 7 > bits.len() as u64);
    assert!(d.stats.final_score.unwrap_or(0) <= 20);
    assert!(d.stats.syncs >= 1);
    assert!(d.stats.sync_losses + 1 >= d.stats.syncs);
}
