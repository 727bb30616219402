use super::Sensor;

/// Earth Surface Mineral Dust Source Investigation L2A reflectance.
///
/// Bands 127..=142 and 187..=212 sit in the 1.4 and 1.9 um water vapour
/// absorption windows and are left out of the subset.
#[derive(Debug)]
pub struct Emit;

impl Sensor for Emit {
    const ID: &'static str = "EMIT";
    const ASSET_ID: Option<&'static str> = Some("NASA/EMIT/L2A/RFL");
    const WAVELENGTHS: &'static [f64] = &WAVELENGTHS;
    const GOOD_RANGES: &'static [(usize, usize)] = &[(0, 126), (143, 186), (213, 284)];
}

const WAVELENGTHS: [f64; 285] = [
    381.00558, 388.4092, 395.81583, 403.2254, 410.638, 418.0536,
    425.47214, 432.8927, 440.31726, 447.7428, 455.17035, 462.59888,
    470.0304, 477.46292, 484.89743, 492.33292, 499.77142, 507.2099,
    514.6504, 522.0909, 529.5333, 536.9768, 544.42126, 551.8667,
    559.3142, 566.7616, 574.20905, 581.6585, 589.108, 596.55835,
    604.0098, 611.4622, 618.9146, 626.36804, 633.8215, 641.2759,
    648.7303, 656.1857, 663.6411, 671.09753, 678.5539, 686.0103,
    693.4677, 700.9251, 708.38354, 715.84094, 723.2993, 730.7587,
    738.2171, 745.6765, 753.1359, 760.5963, 768.0557, 775.5161,
    782.97754, 790.4379, 797.89935, 805.36176, 812.8232, 820.2846,
    827.746, 835.2074, 842.66986, 850.1313, 857.5937, 865.0551,
    872.5176, 879.98004, 887.44147, 894.90393, 902.3664, 909.82886,
    917.2913, 924.7538, 932.21625, 939.6788, 947.14026, 954.6027,
    962.0643, 969.5268, 976.9883, 984.4498, 991.9114, 999.37286,
    1006.8344, 1014.295, 1021.7566, 1029.2172, 1036.6777, 1044.1383,
    1051.5989, 1059.0596, 1066.5201, 1073.9797, 1081.4404, 1088.9,
    1096.3597, 1103.8184, 1111.2781, 1118.7368, 1126.1964, 1133.6552,
    1141.1129, 1148.5717, 1156.0304, 1163.4882, 1170.9459, 1178.4037,
    1185.8616, 1193.3184, 1200.7761, 1208.233, 1215.6898, 1223.1467,
    1230.6036, 1238.0596, 1245.5154, 1252.9724, 1260.4283, 1267.8833,
    1275.3392, 1282.7942, 1290.2502, 1297.7052, 1305.1603, 1312.6144,
    1320.0685, 1327.5225, 1334.9756, 1342.4287, 1349.8818, 1357.3351,
    1364.7872, 1372.2384, 1379.6907, 1387.1418, 1394.5931, 1402.0433,
    1409.4937, 1416.944, 1424.3933, 1431.8427, 1439.292, 1446.7404,
    1454.1888, 1461.6372, 1469.0847, 1476.5321, 1483.9796, 1491.4261,
    1498.8727, 1506.3192, 1513.7649, 1521.2104, 1528.655, 1536.1007,
    1543.5454, 1550.9891, 1558.4329, 1565.8766, 1573.3193, 1580.7621,
    1588.205, 1595.6467, 1603.0886, 1610.5295, 1617.9705, 1625.4104,
    1632.8513, 1640.2903, 1647.7303, 1655.1694, 1662.6074, 1670.0455,
    1677.4836, 1684.9209, 1692.358, 1699.7952, 1707.2314, 1714.6667,
    1722.103, 1729.5383, 1736.9727, 1744.4071, 1751.8414, 1759.2749,
    1766.7084, 1774.1418, 1781.5743, 1789.007, 1796.4385, 1803.8701,
    1811.3008, 1818.7314, 1826.1611, 1833.591, 1841.0206, 1848.4495,
    1855.8773, 1863.3052, 1870.733, 1878.16, 1885.5869, 1893.013,
    1900.439, 1907.864, 1915.2892, 1922.7133, 1930.1375, 1937.5607,
    1944.9839, 1952.4071, 1959.8295, 1967.2518, 1974.6732, 1982.0946,
    1989.515, 1996.9355, 2004.355, 2011.7745, 2019.1931, 2026.6118,
    2034.0304, 2041.4471, 2048.865, 2056.2808, 2063.6965, 2071.1123,
    2078.5273, 2085.9421, 2093.3562, 2100.769, 2108.1821, 2115.5942,
    2123.0063, 2130.4175, 2137.8289, 2145.239, 2152.6482, 2160.0576,
    2167.467, 2174.8755, 2182.283, 2189.6904, 2197.097, 2204.5034,
    2211.9092, 2219.3147, 2226.7195, 2234.1233, 2241.5269, 2248.9297,
    2256.3328, 2263.7346, 2271.1365, 2278.5376, 2285.9387, 2293.3386,
    2300.7378, 2308.136, 2315.5342, 2322.9326, 2330.3298, 2337.7263,
    2345.1216, 2352.517, 2359.9126, 2367.3071, 2374.7007, 2382.0935,
    2389.486, 2396.878, 2404.2695, 2411.6604, 2419.0513, 2426.4402,
    2433.8303, 2441.2183, 2448.6064, 2455.9944, 2463.3816, 2470.7678,
    2478.153, 2485.5386, 2492.9238,
];
