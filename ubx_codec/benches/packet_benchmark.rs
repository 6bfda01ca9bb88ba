use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use ubx_codec::{
    messages::{
        mon::MON_VER,
        nav::{NAV_POSLLH, NAV_STATUS, NAV_SVINFO, NAV_TIMEGPS},
    },
    *,
};

const EPOCHS: usize = 200;

/// One navigation epoch after another, as a receiver would stream them
fn recorded_stream() -> Vec<u8> {
    // chn, svid, flags, quality, cno, elev, azim, prRes
    let channel = Value::Bundle(
        [3, 17, 0x0d, 7, 42, 35, -120, -250]
            .into_iter()
            .map(Value::Int)
            .collect(),
    );

    let mut svinfo = Message::new(&NAV_SVINFO);
    svinfo.set("channels", Value::List(vec![channel; 12]));
    svinfo.refresh();

    let mut posllh = Message::new(&NAV_POSLLH);
    posllh.set("lon", 123_456_789i32);
    posllh.set("lat", 456_789_012i32);

    let mut timegps = Message::new(&NAV_TIMEGPS);
    timegps.set("week", 2086i16);
    timegps.set("leapS", 18i8);

    let mut stream = Vec::new();
    for epoch in 0..EPOCHS {
        let itow = (epoch * 1000) as u32;
        for msg in [&mut posllh, &mut timegps, &mut svinfo] {
            msg.set("iTOW", itow);
        }
        for msg in [&posllh, &timegps, &svinfo] {
            msg.to_frame(&mut stream).unwrap();
        }
        Message::new(&NAV_STATUS).to_frame(&mut stream).unwrap();
    }
    Message::new(&MON_VER).to_frame(&mut stream).unwrap();
    stream
}

fn parse_all<T: UnderlyingBuffer>(mut parser: Parser<T>, data: &[u8], chunk_size: usize) -> usize {
    let mut count = 0;
    for chunk in data.chunks(chunk_size) {
        let mut it = parser.consume(chunk);
        loop {
            match it.next() {
                Some(Ok(_packet)) => {
                    count += 1;
                },
                Some(Err(e)) => {
                    panic!("No errors allowed! got: {:?}", e);
                },
                None => {
                    // We've eaten all the packets we have
                    break;
                },
            }
        }
    }
    count
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let data = recorded_stream();
    let expected = EPOCHS * 4 + 1;

    for chunk in &[99, 100, 101, 256, 512, 1000, 1024] {
        c.bench_function(&format!("vec_parse_pos_{}", chunk), |b| {
            b.iter(|| {
                let parser = Parser::default();
                assert_eq!(parse_all(parser, black_box(&data), *chunk), expected);
            })
        });
    }
    for chunk in &[100, 256, 512, 1024] {
        c.bench_function(&format!("array_parse_pos_256_{}", chunk), |b| {
            b.iter(|| {
                let parser = ParserBuilder::new().with_fixed_buffer::<256>();
                assert_eq!(parse_all(parser, black_box(&data), *chunk), expected);
            })
        });
    }

    let frame = [0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0f, 0x38];
    let dispatcher = Dispatcher::standard();
    c.bench_function("decode_frame_ack_ack", |b| {
        b.iter(|| decode_frame(black_box(&frame), &dispatcher).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
