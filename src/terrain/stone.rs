use crate::cell::StoneType;
use crate::data::MapData;
use crate::tilemap::Tilemap;

/// Stone type for a noise value in `[-1, 1]`, splitting the range into four equal bands.
pub fn stone_for_value(value: f32) -> StoneType {
    let band = ((value + 1.0) * 0.5 * StoneType::ALL.len() as f32).floor() as i32;
    StoneType::ALL[band.clamp(0, StoneType::ALL.len() as i32 - 1) as usize]
}

/// Assign every cell the stone type of its stone noise value.
pub fn assign_stone_types(data: &mut MapData, noise: &Tilemap<f32>) {
    for (x, y, cell) in data.cells_mut().iter_mut() {
        cell.stone_type = stone_for_value(*noise.get(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_bands() {
        assert_eq!(stone_for_value(-1.0), StoneType::Sandstone);
        assert_eq!(stone_for_value(-0.4), StoneType::Granite);
        assert_eq!(stone_for_value(0.2), StoneType::Limestone);
        assert_eq!(stone_for_value(0.7), StoneType::Marble);
        assert_eq!(stone_for_value(1.0), StoneType::Marble);
    }

    #[test]
    fn test_assign_reads_matching_position() {
        let noise = Tilemap::from_fn(2, 2, |x, _| if x == 0 { -0.9 } else { 0.9 });
        let mut data = MapData::new(2);
        assign_stone_types(&mut data, &noise);

        assert_eq!(data.cell(0, 0).stone_type, StoneType::Sandstone);
        assert_eq!(data.cell(1, 0).stone_type, StoneType::Marble);
    }
}
