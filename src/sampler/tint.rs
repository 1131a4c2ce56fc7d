use super::blend::lerp;

/// Block tint table indexed by `[humidity][temperature]`, dry/wet by cold/warm.
const BLOCK_TINTS: [[(u8, u8, u8); 2]; 2] = [
    [(150, 165, 140), (190, 180, 95)],
    [(70, 130, 95), (60, 170, 50)],
];

const COLD_WATER: (u8, u8, u8) = (40, 70, 140);
const WARM_WATER: (u8, u8, u8) = (40, 150, 170);

fn mix(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> (f32, f32, f32) {
    (
        lerp(a.0 as f32, b.0 as f32, t),
        lerp(a.1 as f32, b.1 as f32, t),
        lerp(a.2 as f32, b.2 as f32, t),
    )
}

fn to_color(c: (f32, f32, f32)) -> (u8, u8, u8) {
    (
        c.0.round().clamp(0.0, 255.0) as u8,
        c.1.round().clamp(0.0, 255.0) as u8,
        c.2.round().clamp(0.0, 255.0) as u8,
    )
}

/// Foliage and grass tint for a climate.
pub fn block_tint(temperature: f32, humidity: f32) -> (u8, u8, u8) {
    let t = temperature.clamp(0.0, 1.0);
    let h = humidity.clamp(0.0, 1.0);

    let dry = mix(BLOCK_TINTS[0][0], BLOCK_TINTS[0][1], t);
    let wet = mix(BLOCK_TINTS[1][0], BLOCK_TINTS[1][1], t);

    to_color((lerp(dry.0, wet.0, h), lerp(dry.1, wet.1, h), lerp(dry.2, wet.2, h)))
}

/// Water tint for a temperature.
pub fn fluid_tint(temperature: f32) -> (u8, u8, u8) {
    to_color(mix(COLD_WATER, WARM_WATER, temperature.clamp(0.0, 1.0)))
}
