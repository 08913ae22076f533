// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

extern crate criterion;
extern crate dynstring;

use criterion::{black_box, criterion_group, criterion_main, Bencher, Criterion};
use dynstring::DynString;

static EN_1: &str = "Days turn to nights turn to paper into rocks into plastic";

const SMALL_SIZE: usize = 65536;
const LARGE_SIZE: usize = 1 << 22;

fn append_vec(b: &mut Bencher, &(txt, size): &(&str, usize)) {
    b.iter(|| {
        let mut v = Vec::new();
        while v.len() < size {
            v.extend_from_slice(txt.as_bytes());
        }
        black_box(v)
    });
}

fn append_dynstring(b: &mut Bencher, &(txt, size): &(&str, usize)) {
    b.iter(|| {
        let mut s = DynString::new();
        while s.len() < size {
            s.push_bytes(txt.as_bytes());
        }
        black_box(s)
    });
}

fn append_bytes_one_at_a_time(b: &mut Bencher, &(txt, size): &(&str, usize)) {
    b.iter(|| {
        let mut s = DynString::new();
        for &byte in txt.as_bytes().iter().cycle().take(size) {
            s.push_bytes(&[byte]);
        }
        black_box(s)
    });
}

fn trim_and_range(b: &mut Bencher, &(txt, size): &(&str, usize)) {
    let mut padded = DynString::new();
    padded.grow_zeroed(size / 2);
    padded.push_bytes(txt.as_bytes());
    padded.grow_zeroed(size);
    b.iter(|| {
        let mut s = padded.clone();
        s.trim(b"\0");
        s.range(1, -2);
        black_box(s)
    });
}

fn run_bench_group(c: &mut Criterion, group_name: &str, size: usize) {
    let mut group = c.benchmark_group(group_name);
    let input = (EN_1, size);

    group.bench_with_input("append_vec", &input, append_vec);
    group.bench_with_input("append_dynstring", &input, append_dynstring);
    group.bench_with_input("append_bytes_one_at_a_time", &input, append_bytes_one_at_a_time);
    group.bench_with_input("trim_and_range", &input, trim_and_range);
}

fn dynstring_benchmarks(c: &mut Criterion) {
    run_bench_group(c, "small", SMALL_SIZE);
    run_bench_group(c, "large", LARGE_SIZE);
}

criterion_group!(benches, dynstring_benchmarks);
criterion_main!(benches);
