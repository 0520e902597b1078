// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![no_main]

use libfuzzer_sys::fuzz_target;

use aptx::coding::Decoder;
use aptx::config::Profile;

// The decoder must never panic on arbitrary input; random bytes either
// decode (with roughly 1:256 odds per 8-block window of passing all parity
// checks) or fail with a desync error.
fuzz_target!(|data: &[u8]| {
    for profile in [Profile::Standard, Profile::Hd] {
        let mut decoder = Decoder::new(profile);
        let mut dest = [Vec::new(), Vec::new()];
        let _ = decoder.decode(data, &mut dest);

        // Feeding the same bytes in pieces must not panic either.
        let mut decoder = Decoder::new(profile);
        let mut dest = [Vec::new(), Vec::new()];
        for chunk in data.chunks(profile.block_size()) {
            if chunk.len() == profile.block_size() {
                let _ = decoder.decode_block(chunk);
            } else {
                let _ = decoder.decode(chunk, &mut dest);
            }
        }
    }
});
