//! Plankton, Aerosol, Cloud, ocean Ecosystem (PACE) Ocean Color Instrument tables.
//!
//! No bad band ranges are known for these products, every band is usable.

use super::Sensor;

/// Surface reflectance, hyperspectral VNIR plus the SWIR channels.
#[derive(Debug)]
pub struct PaceOciSr;

impl Sensor for PaceOciSr {
    const ID: &'static str = "PACE_OCI_SR";
    const ASSET_ID: Option<&'static str> = None;
    const WAVELENGTHS: &'static [f64] = &SR_WAVELENGTHS;
    const GOOD_RANGES: &'static [(usize, usize)] = &[(0, SR_WAVELENGTHS.len() - 1)];
}

/// Surface reflectance restricted to the VNIR channels.
#[derive(Debug)]
pub struct PaceOciVnir;

impl Sensor for PaceOciVnir {
    const ID: &'static str = "PACE_OCI_VNIR";
    const ASSET_ID: Option<&'static str> = None;
    const WAVELENGTHS: &'static [f64] = PaceOciSr::WAVELENGTHS.split_at(VNIR_BANDS).0;
    const GOOD_RANGES: &'static [(usize, usize)] = &[(0, VNIR_BANDS - 1)];
}

/// Remote sensing reflectance at full spectral sampling.
#[derive(Debug)]
pub struct PaceOciRrs;

impl Sensor for PaceOciRrs {
    const ID: &'static str = "PACE_OCI_RRS";
    const ASSET_ID: Option<&'static str> = None;
    const WAVELENGTHS: &'static [f64] = &RRS_WAVELENGTHS;
    const GOOD_RANGES: &'static [(usize, usize)] = &[(0, RRS_WAVELENGTHS.len() - 1)];
}

/// The VNIR table is the surface reflectance table without its SWIR tail.
const VNIR_BANDS: usize = 117;

const SR_WAVELENGTHS: [f64; 122] = [
    346.0, 351.0, 356.0, 361.0, 366.0, 371.0, 375.0, 380.0, 385.0, 390.0,
    395.0, 400.0, 405.0, 410.0, 415.0, 420.0, 425.0, 430.0, 435.0, 440.0,
    445.0, 450.0, 455.0, 460.0, 465.0, 470.0, 475.0, 480.0, 485.0, 490.0,
    495.0, 500.0, 505.0, 510.0, 515.0, 520.0, 525.0, 530.0, 535.0, 540.0,
    545.0, 550.0, 555.0, 560.0, 565.0, 570.0, 575.0, 580.0, 586.0, 615.0,
    620.0, 625.0, 630.0, 635.0, 640.0, 642.0, 645.0, 647.0, 650.0, 652.0,
    655.0, 657.0, 660.0, 662.0, 665.0, 667.0, 670.0, 672.0, 675.0, 677.0,
    679.0, 682.0, 697.0, 699.0, 702.0, 704.0, 707.0, 709.0, 712.0, 714.0,
    719.0, 724.0, 729.0, 734.0, 739.0, 742.0, 744.0, 747.0, 749.0, 752.0,
    754.0, 772.0, 774.0, 779.0, 784.0, 789.0, 794.0, 799.0, 804.0, 809.0,
    814.0, 819.0, 824.0, 829.0, 835.0, 840.0, 845.0, 850.0, 855.0, 860.0,
    865.0, 870.0, 875.0, 880.0, 885.0, 890.0, 895.0, 1038.0, 1249.0, 1618.0,
    2131.0, 2258.0,
];

const RRS_WAVELENGTHS: [f64; 172] = [
    346.0, 348.0, 351.0, 353.0, 356.0, 358.0, 361.0, 363.0, 366.0, 368.0,
    371.0, 373.0, 375.0, 378.0, 380.0, 383.0, 385.0, 388.0, 390.0, 393.0,
    395.0, 398.0, 400.0, 403.0, 405.0, 408.0, 410.0, 413.0, 415.0, 418.0,
    420.0, 422.0, 425.0, 427.0, 430.0, 432.0, 435.0, 437.0, 440.0, 442.0,
    445.0, 447.0, 450.0, 452.0, 455.0, 457.0, 460.0, 462.0, 465.0, 467.0,
    470.0, 472.0, 475.0, 477.0, 480.0, 482.0, 485.0, 487.0, 490.0, 492.0,
    495.0, 497.0, 500.0, 502.0, 505.0, 507.0, 510.0, 512.0, 515.0, 517.0,
    520.0, 522.0, 525.0, 527.0, 530.0, 532.0, 535.0, 537.0, 540.0, 542.0,
    545.0, 547.0, 550.0, 553.0, 555.0, 558.0, 560.0, 563.0, 565.0, 568.0,
    570.0, 573.0, 575.0, 578.0, 580.0, 583.0, 586.0, 588.0, 613.0, 615.0,
    618.0, 620.0, 623.0, 625.0, 627.0, 630.0, 632.0, 635.0, 637.0, 640.0,
    641.0, 642.0, 643.0, 645.0, 646.0, 647.0, 648.0, 650.0, 651.0, 652.0,
    653.0, 655.0, 656.0, 657.0, 658.0, 660.0, 661.0, 662.0, 663.0, 665.0,
    666.0, 667.0, 668.0, 670.0, 671.0, 672.0, 673.0, 675.0, 676.0, 677.0,
    678.0, 679.0, 681.0, 682.0, 683.0, 684.0, 686.0, 687.0, 688.0, 689.0,
    691.0, 692.0, 693.0, 694.0, 696.0, 697.0, 698.0, 699.0, 701.0, 702.0,
    703.0, 704.0, 706.0, 707.0, 708.0, 709.0, 711.0, 712.0, 713.0, 714.0,
    717.0, 719.0,
];
