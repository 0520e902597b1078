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

//! Quantizer constant tables.
//!
//! Each subband carries its own companding tables, and the HD profile uses
//! finer-grained variants of the same curves. A table set consists of the
//! quantization interval boundaries (with a negative sentinel at index 0),
//! the dither weights used on both sides of the codec, and the offsets that
//! drive the quantization-factor adaptation.
//!
//! `quantize_dither_factors` is a forward difference of
//! `invert_quantize_dither_factors` and is derived here at compile time
//! instead of being spelled out.

use super::constant::NB_SUBBANDS;

/// One quantizer table set, selected per subband and per profile.
pub(crate) struct Tables {
    pub quantize_intervals: &'static [i32],
    pub invert_quantize_dither_factors: &'static [i32],
    pub quantize_dither_factors: &'static [i32],
    pub quantize_factor_select_offset: &'static [i32],
    /// Upper bound of the `factor_select` adaptation state.
    pub factor_max: i32,
    /// Number of taps of the sign-sign LMS difference predictor.
    pub prediction_order: usize,
}

/// Logarithmic map from `factor_select` to the quantization factor,
/// covering one octave in 32 steps.
pub(crate) const QUANTIZATION_FACTORS: [i32; 32] = [
    2048, 2093, 2139, 2186, 2233, 2282, 2332, 2383,
    2435, 2489, 2543, 2599, 2656, 2714, 2774, 2834,
    2896, 2960, 3025, 3091, 3158, 3228, 3298, 3371,
    3444, 3520, 3597, 3676, 3756, 3838, 3922, 4008,
];

const fn derive_quantize_dither_factors<const N: usize, const M: usize>(
    dither_factors: &[i32; N],
) -> [i32; M] {
    let mut out = [0i32; M];
    let mut i = 0;
    while i < M {
        out[i] = (dither_factors[i + 1] - dither_factors[i] + 2) >> 2;
        i += 1;
    }
    out
}

const QUANTIZE_INTERVALS_LF: [i32; 65] = [
    -9948, 9948, 29860, 49808, 69822, 89926, 110144, 130502,
    151026, 171738, 192666, 213832, 235264, 256982, 279014, 301384,
    324118, 347244, 370790, 394782, 419250, 444226, 469742, 495832,
    522536, 549890, 577936, 606720, 636290, 666700, 698006, 730270,
    763562, 797958, 833538, 870398, 908640, 948376, 989740, 1032874,
    1077948, 1125150, 1174700, 1226850, 1281900, 1340196, 1402156, 1468282,
    1539182, 1615610, 1698514, 1789098, 1888944, 2000168, 2125700, 2269512,
    2436220, 2632460, 2866360, 3148940, 3542940, 4000000, 4635780, 5565340,
    7012540,
];

const INVERT_QUANTIZE_DITHER_FACTORS_LF: [i32; 65] = [
    9948, 9948, 9962, 9988, 10026, 10078, 10142, 10218,
    10306, 10408, 10522, 10650, 10792, 10950, 11122, 11306,
    11508, 11726, 11962, 12214, 12484, 12772, 13080, 13408,
    13756, 14126, 14518, 14932, 15370, 15832, 16320, 16834,
    17376, 17946, 18546, 19178, 19842, 20540, 21274, 22046,
    22856, 23708, 24604, 25546, 26536, 27578, 28674, 29828,
    31044, 32326, 33676, 35100, 36602, 38188, 39864, 41636,
    43512, 45498, 47604, 49838, 52212, 54736, 57424, 60290,
    63348,
];

const QUANTIZE_FACTOR_SELECT_OFFSET_LF: [i32; 65] = [
    0, -21, -19, -17, -15, -12, -10, -8, -6, -4, -1, 1,
    3, 6, 8, 10, 13, 15, 18, 20, 23, 26, 29, 31,
    34, 37, 40, 43, 47, 50, 53, 57, 60, 64, 68, 72,
    76, 80, 85, 89, 94, 99, 105, 110, 116, 123, 129, 136,
    144, 152, 161, 171, 182, 194, 207, 223, 241, 263, 291, 328,
    382, 467, 522, 522, 522,
];

const QUANTIZE_INTERVALS_MLF: [i32; 9] = [
    -89806, 89806, 278502, 494338, 759442, 1113112, 1652322, 2720256,
    5190186,
];

const INVERT_QUANTIZE_DITHER_FACTORS_MLF: [i32; 9] = [
    89806, 89806, 98890, 116946, 148158, 205512, 333698, 734236,
    1735696,
];

const QUANTIZE_FACTOR_SELECT_OFFSET_MLF: [i32; 9] = [
    0, -14, 6, 29, 58, 96, 154, 270, 521,
];

const QUANTIZE_INTERVALS_MHF: [i32; 3] = [
    -194080, 194080, 890562,
];

const INVERT_QUANTIZE_DITHER_FACTORS_MHF: [i32; 3] = [
    194080, 194080, 502402,
];

const QUANTIZE_FACTOR_SELECT_OFFSET_MHF: [i32; 3] = [
    0, -33, 136,
];

const QUANTIZE_INTERVALS_HF: [i32; 5] = [
    -163006, 163006, 542708, 1120554, 2669238,
];

const INVERT_QUANTIZE_DITHER_FACTORS_HF: [i32; 5] = [
    163006, 163006, 216698, 296354, 361724,
];

const QUANTIZE_FACTOR_SELECT_OFFSET_HF: [i32; 5] = [
    0, -8, 33, 95, 262,
];

const QUANTIZE_DITHER_FACTORS_LF: [i32; 64] =
    derive_quantize_dither_factors::<65, 64>(&INVERT_QUANTIZE_DITHER_FACTORS_LF);
const QUANTIZE_DITHER_FACTORS_MLF: [i32; 8] =
    derive_quantize_dither_factors::<9, 8>(&INVERT_QUANTIZE_DITHER_FACTORS_MLF);
const QUANTIZE_DITHER_FACTORS_MHF: [i32; 2] =
    derive_quantize_dither_factors::<3, 2>(&INVERT_QUANTIZE_DITHER_FACTORS_MHF);
const QUANTIZE_DITHER_FACTORS_HF: [i32; 4] =
    derive_quantize_dither_factors::<5, 4>(&INVERT_QUANTIZE_DITHER_FACTORS_HF);

const HD_QUANTIZE_INTERVALS_LF: [i32; 257] = [
    -2488, 2488, 7460, 11414, 15022, 19774, 26026, 31832,
    36176, 41112, 46722, 51956, 56534, 61516, 66936, 72066,
    76772, 81786, 87126, 92234, 97032, 102078, 107386, 112504,
    117376, 122460, 127764, 132906, 137850, 142976, 148294, 153472,
    158482, 163658, 169002, 174224, 179306, 184534, 189916, 195192,
    200346, 205636, 211064, 216400, 221630, 226986, 232472, 237876,
    243184, 248612, 254162, 259638, 265032, 270538, 276160, 281716,
    287202, 292792, 298492, 304136, 309716, 315398, 321186, 326922,
    332604, 338384, 344266, 350104, 355894, 361778, 367762, 373708,
    379612, 385608, 391700, 397760, 403786, 409902, 416110, 422294,
    428448, 434690, 441024, 447338, 453628, 460006, 466474, 472926,
    479360, 485882, 492494, 499094, 505682, 512358, 519120, 525880,
    532630, 539468, 546394, 553320, 560244, 567254, 574354, 581458,
    588566, 595762, 603046, 610340, 617644, 625036, 632516, 640014,
    647528, 655130, 662820, 670536, 678272, 686098, 694014, 701960,
    709934, 718000, 726156, 734350, 742580, 750904, 759318, 767780,
    776284, 784882, 793576, 802322, 811118, 820014, 829006, 838058,
    847174, 856388, 865702, 875088, 884546, 894106, 903770, 913514,
    923342, 933276, 943316, 953450, 963680, 974022, 984472, 995032,
    1005700, 1016482, 1027382, 1038404, 1049552, 1060820, 1072208, 1083738,
    1095412, 1107212, 1119138, 1131228, 1143482, 1155868, 1168388, 1181096,
    1193992, 1207028, 1220206, 1233600, 1247212, 1260972, 1274886, 1289046,
    1303458, 1318030, 1332766, 1347788, 1363104, 1378592, 1394256, 1410256,
    1426596, 1443126, 1459848, 1476962, 1494478, 1512202, 1530136, 1548534,
    1567410, 1586514, 1605852, 1625748, 1646214, 1666938, 1687922, 1709582,
    1731932, 1754576, 1777516, 1801284, 1825906, 1850864, 1876164, 1902502,
    1929910, 1957712, 1985914, 2015444, 2046350, 2077728, 2109588, 2143166,
    2178530, 2214476, 2251016, 2289710, 2330646, 2372316, 2414730, 2459926,
    2508034, 2557082, 2607090, 2660620, 2717848, 2776306, 2836022, 2900246,
    2969226, 3039848, 3112148, 3195688, 3291274, 3389722, 3491112, 3597086,
    3707874, 3822072, 3939790, 4074440, 4227500, 4386310, 4551086, 4742900,
    4964622, 5196708, 5439646, 5728484, 6069258, 6430304, 6812828, 7012540,
    7012542,
];

const HD_INVERT_QUANTIZE_DITHER_FACTORS_LF: [i32; 257] = [
    2488, 2488, 2488, 2488, 2488, 2490, 2490, 2492,
    2492, 2494, 2496, 2498, 2500, 2502, 2506, 2508,
    2512, 2514, 2518, 2522, 2526, 2530, 2534, 2538,
    2542, 2548, 2552, 2558, 2562, 2568, 2574, 2580,
    2586, 2592, 2598, 2606, 2612, 2620, 2626, 2634,
    2642, 2650, 2658, 2666, 2676, 2684, 2694, 2702,
    2712, 2722, 2732, 2742, 2754, 2764, 2776, 2786,
    2798, 2810, 2820, 2832, 2846, 2858, 2870, 2884,
    2898, 2910, 2924, 2938, 2954, 2968, 2984, 2998,
    3014, 3030, 3046, 3062, 3078, 3096, 3112, 3130,
    3148, 3166, 3184, 3202, 3222, 3240, 3260, 3280,
    3300, 3322, 3342, 3362, 3384, 3406, 3428, 3450,
    3474, 3496, 3520, 3544, 3568, 3592, 3618, 3642,
    3668, 3694, 3720, 3746, 3774, 3802, 3828, 3856,
    3886, 3914, 3944, 3974, 4004, 4034, 4064, 4096,
    4128, 4160, 4192, 4226, 4258, 4292, 4326, 4362,
    4396, 4432, 4468, 4504, 4542, 4580, 4618, 4656,
    4696, 4734, 4774, 4814, 4856, 4898, 4940, 4982,
    5026, 5068, 5112, 5158, 5204, 5248, 5296, 5342,
    5390, 5438, 5486, 5536, 5586, 5638, 5688, 5740,
    5792, 5846, 5900, 5954, 6010, 6066, 6122, 6180,
    6238, 6298, 6356, 6416, 6478, 6540, 6602, 6666,
    6730, 6796, 6862, 6928, 6996, 7064, 7134, 7204,
    7276, 7348, 7420, 7494, 7570, 7646, 7722, 7800,
    7880, 7960, 8040, 8122, 8206, 8290, 8376, 8462,
    8550, 8640, 8730, 8822, 8914, 9008, 9102, 9200,
    9298, 9396, 9496, 9598, 9702, 9806, 9912, 10020,
    10130, 10240, 10352, 10466, 10582, 10700, 10818, 10938,
    11062, 11186, 11312, 11440, 11570, 11700, 11834, 11970,
    12108, 12248, 12388, 12532, 12678, 12828, 12978, 13130,
    13286, 13444, 13604, 13766, 13932, 14100, 14270, 14444,
    14620, 14800, 14982, 15166, 15354, 15546, 15740, 15836,
    15836,
];

const HD_QUANTIZE_FACTOR_SELECT_OFFSET_LF: [i32; 257] = [
    0, -21, -21, -21, -20, -20, -19, -19, -18, -18, -17, -17,
    -16, -16, -15, -15, -14, -13, -12, -12, -11, -11, -10, -10,
    -9, -9, -8, -8, -7, -7, -6, -6, -5, -5, -4, -4,
    -3, -2, -1, -1, 0, 0, 1, 1, 2, 2, 3, 3,
    4, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10,
    11, 12, 13, 13, 14, 14, 15, 15, 16, 17, 18, 18,
    19, 19, 20, 20, 21, 22, 23, 23, 24, 25, 26, 26,
    27, 28, 29, 29, 30, 30, 31, 31, 32, 33, 34, 34,
    35, 36, 37, 37, 38, 39, 40, 40, 41, 42, 43, 44,
    44, 46, 46, 47, 48, 49, 50, 50, 51, 52, 53, 54,
    54, 56, 56, 57, 58, 59, 60, 60, 62, 62, 64, 64,
    66, 66, 68, 68, 70, 70, 72, 72, 74, 74, 76, 76,
    78, 78, 80, 81, 82, 83, 84, 86, 86, 88, 88, 90,
    91, 92, 93, 95, 96, 97, 98, 100, 101, 103, 104, 106,
    107, 108, 109, 111, 112, 114, 115, 117, 119, 120, 122, 124,
    125, 127, 128, 130, 132, 133, 135, 137, 139, 141, 143, 145,
    147, 149, 151, 153, 155, 158, 160, 162, 165, 167, 170, 172,
    175, 178, 181, 184, 186, 190, 192, 196, 199, 202, 205, 209,
    213, 217, 221, 225, 230, 234, 239, 244, 249, 255, 260, 266,
    274, 280, 288, 296, 305, 314, 323, 335, 348, 362, 375, 393,
    414, 435, 456, 474, 488, 501, 515, 522, 522, 522, 522, 522,
    522, 522, 522, 522, 522,
];

const HD_QUANTIZE_INTERVALS_MLF: [i32; 33] = [
    -22452, 22452, 67354, 103454, 137286, 182182, 241762, 299212,
    345364, 398636, 460124, 521594, 580698, 646500, 719756, 796618,
    876518, 964434, 1061166, 1169454, 1290840, 1424824, 1572716, 1758568,
    1991994, 2256402, 2555910, 2949046, 3465970, 4073502, 4787528, 5190186,
    5190188,
];

const HD_INVERT_QUANTIZE_DITHER_FACTORS_MLF: [i32; 33] = [
    22452, 22452, 22452, 22724, 23278, 23846, 24426, 25246,
    26328, 27454, 28630, 30114, 31948, 33896, 35960, 38586,
    41876, 45444, 49318, 54588, 61620, 69558, 78520, 92066,
    112130, 136566, 166328, 204400, 253448, 314268, 389680, 433924,
    433924,
];

const HD_QUANTIZE_FACTOR_SELECT_OFFSET_MLF: [i32; 33] = [
    0, -14, -14, -12, -6, -2, 4, 9, 15, 20, 26, 33,
    40, 47, 54, 63, 72, 82, 91, 103, 118, 132, 147, 168,
    198, 226, 256, 301, 364, 427, 490, 521, 521,
];

const HD_QUANTIZE_INTERVALS_MHF: [i32; 9] = [
    -48520, 48520, 145560, 234796, 343646, 502960, 736128, 890562,
    890564,
];

const HD_INVERT_QUANTIZE_DITHER_FACTORS_MHF: [i32; 9] = [
    48520, 48520, 48520, 54646, 69314, 87920, 111522, 125600,
    125600,
];

const HD_QUANTIZE_FACTOR_SELECT_OFFSET_MHF: [i32; 9] = [
    0, -33, -33, -12, 30, 73, 115, 136, 136,
];

const HD_QUANTIZE_INTERVALS_HF: [i32; 17] = [
    -40752, 40752, 122254, 189452, 255912, 345684, 466950, 594188,
    712264, 853804, 1023468, 1248970, 1551640, 1927656, 2394794, 2669238,
    2669240,
];

const HD_INVERT_QUANTIZE_DITHER_FACTORS_HF: [i32; 17] = [
    40752, 40752, 40752, 42228, 45344, 48688, 52280, 57746,
    65612, 74548, 84702, 104772, 141086, 189988, 255840, 296884,
    296884,
];

const HD_QUANTIZE_FACTOR_SELECT_OFFSET_HF: [i32; 17] = [
    0, -8, -8, -3, 7, 18, 28, 41, 56, 72, 87, 116,
    158, 199, 241, 262, 262,
];

const HD_QUANTIZE_DITHER_FACTORS_LF: [i32; 256] =
    derive_quantize_dither_factors::<257, 256>(&HD_INVERT_QUANTIZE_DITHER_FACTORS_LF);
const HD_QUANTIZE_DITHER_FACTORS_MLF: [i32; 32] =
    derive_quantize_dither_factors::<33, 32>(&HD_INVERT_QUANTIZE_DITHER_FACTORS_MLF);
const HD_QUANTIZE_DITHER_FACTORS_MHF: [i32; 8] =
    derive_quantize_dither_factors::<9, 8>(&HD_INVERT_QUANTIZE_DITHER_FACTORS_MHF);
const HD_QUANTIZE_DITHER_FACTORS_HF: [i32; 16] =
    derive_quantize_dither_factors::<17, 16>(&HD_INVERT_QUANTIZE_DITHER_FACTORS_HF);

/// Table sets indexed by `[hd][subband]`, subbands ordered LL, LH, HL, HH.
pub(crate) static ALL_TABLES: [[Tables; NB_SUBBANDS]; 2] = [
    [
        Tables {
            quantize_intervals: &QUANTIZE_INTERVALS_LF,
            invert_quantize_dither_factors: &INVERT_QUANTIZE_DITHER_FACTORS_LF,
            quantize_dither_factors: &QUANTIZE_DITHER_FACTORS_LF,
            quantize_factor_select_offset: &QUANTIZE_FACTOR_SELECT_OFFSET_LF,
            factor_max: 0x11FF,
            prediction_order: 24,
        },
        Tables {
            quantize_intervals: &QUANTIZE_INTERVALS_MLF,
            invert_quantize_dither_factors: &INVERT_QUANTIZE_DITHER_FACTORS_MLF,
            quantize_dither_factors: &QUANTIZE_DITHER_FACTORS_MLF,
            quantize_factor_select_offset: &QUANTIZE_FACTOR_SELECT_OFFSET_MLF,
            factor_max: 0x14FF,
            prediction_order: 12,
        },
        Tables {
            quantize_intervals: &QUANTIZE_INTERVALS_MHF,
            invert_quantize_dither_factors: &INVERT_QUANTIZE_DITHER_FACTORS_MHF,
            quantize_dither_factors: &QUANTIZE_DITHER_FACTORS_MHF,
            quantize_factor_select_offset: &QUANTIZE_FACTOR_SELECT_OFFSET_MHF,
            factor_max: 0x16FF,
            prediction_order: 6,
        },
        Tables {
            quantize_intervals: &QUANTIZE_INTERVALS_HF,
            invert_quantize_dither_factors: &INVERT_QUANTIZE_DITHER_FACTORS_HF,
            quantize_dither_factors: &QUANTIZE_DITHER_FACTORS_HF,
            quantize_factor_select_offset: &QUANTIZE_FACTOR_SELECT_OFFSET_HF,
            factor_max: 0x15FF,
            prediction_order: 12,
        },
    ],
    [
        Tables {
            quantize_intervals: &HD_QUANTIZE_INTERVALS_LF,
            invert_quantize_dither_factors: &HD_INVERT_QUANTIZE_DITHER_FACTORS_LF,
            quantize_dither_factors: &HD_QUANTIZE_DITHER_FACTORS_LF,
            quantize_factor_select_offset: &HD_QUANTIZE_FACTOR_SELECT_OFFSET_LF,
            factor_max: 0x11FF,
            prediction_order: 24,
        },
        Tables {
            quantize_intervals: &HD_QUANTIZE_INTERVALS_MLF,
            invert_quantize_dither_factors: &HD_INVERT_QUANTIZE_DITHER_FACTORS_MLF,
            quantize_dither_factors: &HD_QUANTIZE_DITHER_FACTORS_MLF,
            quantize_factor_select_offset: &HD_QUANTIZE_FACTOR_SELECT_OFFSET_MLF,
            factor_max: 0x14FF,
            prediction_order: 12,
        },
        Tables {
            quantize_intervals: &HD_QUANTIZE_INTERVALS_MHF,
            invert_quantize_dither_factors: &HD_INVERT_QUANTIZE_DITHER_FACTORS_MHF,
            quantize_dither_factors: &HD_QUANTIZE_DITHER_FACTORS_MHF,
            quantize_factor_select_offset: &HD_QUANTIZE_FACTOR_SELECT_OFFSET_MHF,
            factor_max: 0x16FF,
            prediction_order: 6,
        },
        Tables {
            quantize_intervals: &HD_QUANTIZE_INTERVALS_HF,
            invert_quantize_dither_factors: &HD_INVERT_QUANTIZE_DITHER_FACTORS_HF,
            quantize_dither_factors: &HD_QUANTIZE_DITHER_FACTORS_HF,
            quantize_factor_select_offset: &HD_QUANTIZE_FACTOR_SELECT_OFFSET_HF,
            factor_max: 0x15FF,
            prediction_order: 12,
        },
    ],
];
