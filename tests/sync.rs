use bytes::BytesMut;
use chrono::{TimeZone, Utc};
use rftime::core::{NodeConfig, SyncBound};
use rftime::link::sim::{ManualClock, SimulatedRadio, Transmission};
use rftime::link::{LinkPoller, PollOutcome};
use rftime::protocol::{PacketCodec, SyncState, TimePacket, TimeSync, WireFormat};
use rftime::status::{MemorySink, NullSink};
use rftime::time::{CalendarFields, MemoryRtc, RtcStore, Timestamp};
use rftime::Error;
use tokio_util::codec::{Decoder, Encoder};

fn current_frame(fields: CalendarFields, weekday_raw: u8) -> Vec<u8> {
    let mut buf = vec![0u8; 32];
    buf[..5].copy_from_slice(&[0xFE, b'T', b'I', b'M', b'E']);
    buf[5..7].copy_from_slice(&fields.year.to_le_bytes());
    buf[7..12].copy_from_slice(&[fields.month, fields.day, fields.hour, fields.minute, fields.second]);
    buf[12] = weekday_raw;
    buf
}

#[test]
fn test_current_format_packet_end_to_end() {
    let frame = current_frame(CalendarFields::new(2020, 7, 24, 10, 30, 0), 3);

    let packet = TimePacket::decode(WireFormat::Current, &frame).unwrap();
    assert_eq!(packet.fields.year_offset(), 50);
    assert_eq!(packet.weekday, Some(4));

    let config = NodeConfig::default();
    let radio = SimulatedRadio::new().with_transmission(Transmission::frame(frame));
    let link = LinkPoller::new(radio, ManualClock::new(0, 1), &config.radio).unwrap();
    let mut sync = TimeSync::new(link, MemoryRtc::default(), NullSink, &config).unwrap();

    let timestamp = sync.synchronize().unwrap();
    let expected = Utc.with_ymd_and_hms(2020, 7, 24, 10, 30, 0).unwrap().timestamp();
    assert_eq!(timestamp, Timestamp(expected));
    assert_eq!(sync.rtc().get(), Timestamp(expected));
}

#[test]
fn test_exactly_one_commit_after_many_failures() {
    let config = NodeConfig::default();
    let valid = TimePacket::new(CalendarFields::new(2024, 2, 29, 12, 0, 0)).encode(WireFormat::Current);

    let mut script = Vec::new();
    for i in 0..40 {
        if i % 2 == 0 {
            script.push(Transmission::Silence);
        } else {
            script.push(Transmission::frame(vec![i as u8; 32]));
        }
    }
    script.push(Transmission::frame(valid.clone()));
    script.push(Transmission::frame(valid));

    let radio = SimulatedRadio::new().with_script(script);
    let link = LinkPoller::new(radio, ManualClock::new(0, 1), &config.radio).unwrap();
    let mut sync = TimeSync::new(link, MemoryRtc::default(), MemorySink::default(), &config).unwrap();

    sync.synchronize().unwrap();

    assert_eq!(sync.rtc().write_count(), 1);
    assert_eq!(sync.status().attempts(), 41);
    assert_eq!(sync.status().consecutive_failures(), 0);
    // One valid broadcast remains unheard
    assert_eq!(sync.link().radio().remaining(), 1);
    // Flush after 30 consecutive failures, then the success line
    assert_eq!(sync.reporter().sink().lines.len(), 2);
    assert!(sync.reporter().sink().lines[0].starts_with("failures 30 "));
}

#[test]
fn test_resync_commits_again() {
    let config = NodeConfig::default();
    let first = TimePacket::new(CalendarFields::new(2024, 1, 1, 0, 0, 0)).encode(WireFormat::Current);
    let second = TimePacket::new(CalendarFields::new(2024, 1, 2, 0, 0, 0)).encode(WireFormat::Current);

    let radio = SimulatedRadio::new().with_script([
        Transmission::frame(first),
        Transmission::Silence,
        Transmission::frame(second),
    ]);
    let link = LinkPoller::new(radio, ManualClock::new(0, 1), &config.radio).unwrap();
    let mut sync = TimeSync::new(link, MemoryRtc::default(), NullSink, &config).unwrap();

    let a = sync.synchronize().unwrap();
    let b = sync.synchronize().unwrap();

    assert_eq!(b.as_secs() - a.as_secs(), 86_400);
    assert_eq!(sync.rtc().write_count(), 2);
    assert_eq!(sync.rtc().get(), b);
    assert_eq!(sync.state(), SyncState::Committed(b));
}

#[test]
fn test_bounded_run_on_dead_link() {
    let config = NodeConfig::default();
    let link = LinkPoller::new(SimulatedRadio::new(), ManualClock::new(u32::MAX - 10, 1), &config.radio).unwrap();
    let mut sync = TimeSync::new(link, MemoryRtc::new(Timestamp(123)), NullSink, &config)
        .unwrap()
        .with_bound(SyncBound {
            max_attempts: Some(3),
            max_duration: None,
        });

    let err = sync.synchronize().unwrap_err();
    match err {
        Error::SyncAborted { attempts, elapsed_ms } => {
            assert_eq!(attempts, 3);
            assert!(elapsed_ms >= 3_000, "elapsed {} ms", elapsed_ms);
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(sync.rtc().get(), Timestamp(123));
}

#[test]
fn test_lossy_link_eventually_syncs() {
    let config = NodeConfig::default();
    let valid = TimePacket::new(CalendarFields::new(2030, 6, 15, 6, 0, 0)).encode(WireFormat::Current);

    let radio = SimulatedRadio::new()
        .with_script((0..200).map(|_| Transmission::frame(valid.clone())))
        .with_loss(0.7, 1234);
    let link = LinkPoller::new(radio, ManualClock::new(0, 1), &config.radio).unwrap();
    let mut sync = TimeSync::new(link, MemoryRtc::default(), NullSink, &config).unwrap();

    let timestamp = sync.synchronize().unwrap();
    assert_eq!(timestamp.to_string(), "2030-06-15 06:00:00");

    let lost = sync.link().radio().lost() as u64;
    assert_eq!(sync.status().timeouts(), lost);
    assert_eq!(sync.status().attempts(), lost + 1);
}

#[test]
fn test_poller_leaves_radio_idle() {
    let config = NodeConfig::default();
    let radio = SimulatedRadio::new().with_script([
        Transmission::Silence,
        Transmission::frame(vec![1u8; 32]),
    ]);
    let mut poller = LinkPoller::new(radio, ManualClock::new(0, 7), &config.radio).unwrap();

    assert_eq!(poller.poll(100), PollOutcome::Timeout);
    assert!(!poller.radio().is_listening());
    assert!(matches!(poller.poll(100), PollOutcome::Packet(_)));
    assert!(!poller.radio().is_listening());
}

#[test]
fn test_codec_bridge_feeds_decoder() {
    let mut codec = PacketCodec::new(WireFormat::Current, Default::default());
    let mut stream = BytesMut::new();

    let packet = TimePacket::from_datetime(&Utc.with_ymd_and_hms(2025, 12, 25, 18, 0, 0).unwrap());
    stream.extend_from_slice(&[0x55; 7]);
    codec.encode(packet, &mut stream).unwrap();

    let decoded = codec.decode(&mut stream).unwrap().unwrap();
    assert_eq!(decoded, packet);
    assert_eq!(codec.decode_eof(&mut stream).unwrap(), None);
}
