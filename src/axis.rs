use crate::codes::*;
use tracing::warn;

/// Span assumed for axes that were enabled without a calibrated range.
pub const UNCALIBRATED_SPAN: i32 = u16::MAX as i32;

/// The per-contact MT axes a protocol A device may report.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub enum MtAxis {
    TouchMajor,
    TouchMinor,
    WidthMajor,
    WidthMinor,
    Orientation,
    PositionX,
    PositionY,
    ToolType,
    BlobId,
    TrackingId,
    Pressure,
    Distance,
    ToolX,
    ToolY,
}

pub const MT_AXIS_COUNT: usize = 14;

impl MtAxis {
    pub const ALL: [MtAxis; MT_AXIS_COUNT] = [
        MtAxis::TouchMajor,
        MtAxis::TouchMinor,
        MtAxis::WidthMajor,
        MtAxis::WidthMinor,
        MtAxis::Orientation,
        MtAxis::PositionX,
        MtAxis::PositionY,
        MtAxis::ToolType,
        MtAxis::BlobId,
        MtAxis::TrackingId,
        MtAxis::Pressure,
        MtAxis::Distance,
        MtAxis::ToolX,
        MtAxis::ToolY,
    ];

    pub fn from_code(code: u16) -> Option<MtAxis> {
        code.checked_sub(ABS_MT_TOUCH_MAJOR)
            .and_then(|index| MtAxis::ALL.get(index as usize))
            .copied()
    }

    pub fn code(self) -> u16 {
        ABS_MT_TOUCH_MAJOR + self.index() as u16
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Axes that take part in contact matching.
    pub fn is_position(self) -> bool {
        matches!(self, MtAxis::PositionX | MtAxis::PositionY)
    }
}

/// Calibration of one absolute axis, as reported by `EVIOCGABS`.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct AbsInfo {
    pub minimum: i32,
    pub maximum: i32,
    pub fuzz: i32,
    pub resolution: i32,
}

impl AbsInfo {
    pub fn new(minimum: i32, maximum: i32) -> AbsInfo {
        AbsInfo {
            minimum,
            maximum,
            ..AbsInfo::default()
        }
    }

    pub fn with_fuzz(self, fuzz: i32) -> AbsInfo {
        AbsInfo { fuzz, ..self }
    }

    fn normalized(self) -> AbsInfo {
        if self.minimum > self.maximum {
            AbsInfo {
                minimum: self.maximum,
                maximum: self.minimum,
                ..self
            }
        } else {
            self
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.maximum > self.minimum
    }

    pub fn clamp(&self, value: i32) -> i32 {
        if self.is_calibrated() {
            value.clamp(self.minimum, self.maximum)
        } else {
            value
        }
    }

    pub fn span(&self) -> i32 {
        if self.is_calibrated() {
            self.maximum.saturating_sub(self.minimum)
        } else {
            UNCALIBRATED_SPAN
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Minimum,
    Maximum,
    Fuzz,
    Resolution,
}

/// Calibration and enabled flags for the bounded set of MT axis codes,
/// plus `ABS_MT_SLOT` for sources that already speak protocol B.
#[derive(Debug, Clone, Default)]
pub struct AxisTable {
    abs: [AbsInfo; MT_AXIS_COUNT],
    enabled: u16,
    slot: AbsInfo,
    slot_enabled: bool,
}

impl AxisTable {
    pub fn new() -> AxisTable {
        AxisTable::default()
    }

    /// Enables `code` and records its calibration. Unknown codes are ignored.
    pub fn set_abs(&mut self, code: u16, info: AbsInfo) {
        let info = info.normalized();
        if code == ABS_MT_SLOT {
            self.slot = info;
            self.slot_enabled = true;
        } else if let Some(axis) = MtAxis::from_code(code) {
            self.abs[axis.index()] = info;
            self.enabled |= 1 << axis.index();
        } else {
            warn!(code, "ignoring calibration for a non-MT axis");
        }
    }

    /// Toggles participation of `code` without touching its calibration.
    pub fn set_event(&mut self, code: u16, enabled: bool) {
        if code == ABS_MT_SLOT {
            self.slot_enabled = enabled;
        } else if let Some(axis) = MtAxis::from_code(code) {
            if enabled {
                self.enabled |= 1 << axis.index();
            } else {
                self.enabled &= !(1 << axis.index());
            }
        } else {
            warn!(code, "ignoring enable flag for a non-MT axis");
        }
    }

    pub fn set_minimum(&mut self, code: u16, value: i32) {
        self.set_field(code, Field::Minimum, value);
    }

    pub fn set_maximum(&mut self, code: u16, value: i32) {
        self.set_field(code, Field::Maximum, value);
    }

    pub fn set_fuzz(&mut self, code: u16, value: i32) {
        self.set_field(code, Field::Fuzz, value);
    }

    pub fn set_resolution(&mut self, code: u16, value: i32) {
        self.set_field(code, Field::Resolution, value);
    }

    // Moving one bound past the other drags the other along, so
    // `minimum <= maximum` always holds.
    fn set_field(&mut self, code: u16, field: Field, value: i32) {
        let info = match self.info_mut(code) {
            Some(info) => info,
            None => return,
        };
        match field {
            Field::Minimum => {
                info.minimum = value;
                info.maximum = info.maximum.max(value);
            }
            Field::Maximum => {
                info.maximum = value;
                info.minimum = info.minimum.min(value);
            }
            Field::Fuzz => info.fuzz = value,
            Field::Resolution => info.resolution = value,
        }
    }

    fn info_mut(&mut self, code: u16) -> Option<&mut AbsInfo> {
        if code == ABS_MT_SLOT {
            Some(&mut self.slot)
        } else {
            match MtAxis::from_code(code) {
                Some(axis) => Some(&mut self.abs[axis.index()]),
                None => None,
            }
        }
    }

    pub fn has_event(&self, code: u16) -> bool {
        if code == ABS_MT_SLOT {
            self.slot_enabled
        } else {
            MtAxis::from_code(code).map_or(false, |axis| self.is_enabled(axis))
        }
    }

    pub fn abs_info(&self, code: u16) -> Option<AbsInfo> {
        if code == ABS_MT_SLOT {
            Some(self.slot)
        } else {
            MtAxis::from_code(code).map(|axis| self.info(axis))
        }
    }

    pub fn is_enabled(&self, axis: MtAxis) -> bool {
        self.enabled & (1 << axis.index()) != 0
    }

    pub fn info(&self, axis: MtAxis) -> AbsInfo {
        self.abs[axis.index()]
    }

    /// True when the source reports `ABS_MT_SLOT` itself.
    pub fn has_slot(&self) -> bool {
        self.slot_enabled
    }

    pub fn enabled_axes(&self) -> impl Iterator<Item = MtAxis> + '_ {
        MtAxis::ALL
            .iter()
            .copied()
            .filter(move |axis| self.is_enabled(*axis))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    mod mt_axis {
        use super::*;

        #[test]
        fn maps_codes_in_both_directions() {
            for axis in MtAxis::ALL.iter() {
                assert_eq!(MtAxis::from_code(axis.code()), Some(*axis));
            }
            assert_eq!(MtAxis::from_code(ABS_MT_POSITION_X), Some(MtAxis::PositionX));
            assert_eq!(MtAxis::from_code(ABS_MT_TOOL_Y), Some(MtAxis::ToolY));
        }

        #[test]
        fn rejects_codes_outside_the_mt_range() {
            assert_eq!(MtAxis::from_code(ABS_X), None);
            assert_eq!(MtAxis::from_code(ABS_MT_SLOT), None);
            assert_eq!(MtAxis::from_code(ABS_MT_TOOL_Y + 1), None);
            assert_eq!(MtAxis::from_code(u16::MAX), None);
        }
    }

    mod axis_table {
        use super::*;

        #[test]
        fn set_abs_enables_and_calibrates() {
            let mut table = AxisTable::new();
            table.set_abs(ABS_MT_POSITION_X, AbsInfo::new(0, 1000));
            assert!(table.is_enabled(MtAxis::PositionX));
            assert!(!table.is_enabled(MtAxis::PositionY));
            assert_eq!(table.info(MtAxis::PositionX), AbsInfo::new(0, 1000));
        }

        #[test]
        fn set_event_keeps_calibration() {
            let mut table = AxisTable::new();
            table.set_abs(ABS_MT_PRESSURE, AbsInfo::new(0, 255));
            table.set_event(ABS_MT_PRESSURE, false);
            assert!(!table.has_event(ABS_MT_PRESSURE));
            table.set_event(ABS_MT_PRESSURE, true);
            assert!(table.has_event(ABS_MT_PRESSURE));
            assert_eq!(table.abs_info(ABS_MT_PRESSURE), Some(AbsInfo::new(0, 255)));
        }

        #[test]
        fn ignores_unsupported_codes() {
            let mut table = AxisTable::new();
            table.set_abs(ABS_X, AbsInfo::new(0, 10));
            table.set_event(ABS_Y, true);
            assert_eq!(table.enabled_axes().count(), 0);
            assert_eq!(table.abs_info(ABS_X), None);
            assert!(!table.has_event(ABS_Y));
        }

        #[test]
        fn swaps_inverted_ranges() {
            let mut table = AxisTable::new();
            table.set_abs(ABS_MT_POSITION_Y, AbsInfo::new(500, 10));
            assert_eq!(table.info(MtAxis::PositionY), AbsInfo::new(10, 500));
        }

        #[test]
        fn field_setters_keep_minimum_below_maximum() {
            let mut table = AxisTable::new();
            table.set_minimum(ABS_MT_POSITION_X, 50);
            assert_eq!(table.info(MtAxis::PositionX), AbsInfo::new(50, 50));
            table.set_maximum(ABS_MT_POSITION_X, 20);
            assert_eq!(table.info(MtAxis::PositionX), AbsInfo::new(20, 20));
            table.set_fuzz(ABS_MT_POSITION_X, 4);
            table.set_resolution(ABS_MT_POSITION_X, 12);
            let info = table.info(MtAxis::PositionX);
            assert_eq!((info.fuzz, info.resolution), (4, 12));
            assert!(!table.is_enabled(MtAxis::PositionX));
        }

        #[test]
        fn tracks_the_slot_axis_separately() {
            let mut table = AxisTable::new();
            assert!(!table.has_slot());
            table.set_abs(ABS_MT_SLOT, AbsInfo::new(0, 9));
            assert!(table.has_slot());
            assert_eq!(table.enabled_axes().count(), 0);
        }

        #[test]
        fn lists_enabled_axes_in_code_order() {
            let mut table = AxisTable::new();
            table.set_abs(ABS_MT_POSITION_Y, AbsInfo::new(0, 1));
            table.set_abs(ABS_MT_TOUCH_MAJOR, AbsInfo::new(0, 1));
            table.set_abs(ABS_MT_POSITION_X, AbsInfo::new(0, 1));
            assert_eq!(
                table.enabled_axes().collect::<Vec<_>>(),
                vec![MtAxis::TouchMajor, MtAxis::PositionX, MtAxis::PositionY]
            );
        }
    }

    mod abs_info {
        use super::*;

        #[test]
        fn clamps_only_calibrated_axes() {
            assert_eq!(AbsInfo::new(0, 100).clamp(150), 100);
            assert_eq!(AbsInfo::new(0, 100).clamp(-3), 0);
            assert_eq!(AbsInfo::default().clamp(-3), -3);
        }

        #[test]
        fn falls_back_to_a_default_span() {
            assert_eq!(AbsInfo::new(100, 300).span(), 200);
            assert_eq!(AbsInfo::default().span(), UNCALIBRATED_SPAN);
        }
    }
}
