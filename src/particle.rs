use crate::palette::{self, Rgb};
use crate::surface::{Scoped, Surface};
use std::f32::consts::TAU;

const DRAG: f32 = 0.98;
const GRAVITY: f32 = 0.04;
const GLOW: f32 = 7.0;

/// Where burst particles take their colour from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ParticleColors {
    /// Every particle picks its own palette colour.
    #[default]
    Random,
    /// Particles share the colour of the rocket that burst.
    Inherit,
}

/// One glowing spark of a burst.
#[derive(Clone, Debug)]
pub struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    color: Rgb,
    alpha: f32,
    decay: f32,
    gravity: f32,
    radius: f32,
}

impl Particle {
    /// Spawns a particle at `(x, y)` flying off in a random direction.
    pub fn burst(
        rng: &mut fastrand::Rng,
        x: f32,
        y: f32,
        hint: Rgb,
        colors: ParticleColors,
    ) -> Self {
        let color = match colors {
            ParticleColors::Random => palette::pick(rng),
            ParticleColors::Inherit => hint,
        };
        let angle = rng.f32() * TAU;
        let speed = rng.f32() * 5.0 + 2.0;

        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            color,
            alpha: 1.0,
            decay: rng.f32() * 0.02 + 0.015,
            gravity: GRAVITY,
            radius: rng.f32() * 2.0 + 1.5,
        }
    }

    pub fn update(&mut self) {
        self.vx *= DRAG;
        self.vy *= DRAG;
        self.vy += self.gravity;
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= self.decay;
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let mut ctx = Scoped::new(surface);
        ctx.set_global_alpha(self.alpha.clamp(0.0, 1.0));
        ctx.set_fill(self.color);
        ctx.set_shadow(GLOW, self.color);
        ctx.fill_circle(self.x, self.y, self.radius);
    }

    pub fn is_dead(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    #[cfg(test)]
    pub(crate) fn with_decay(mut self, decay: f32) -> Self {
        self.decay = decay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::NEON;
    use crate::surface::Canvas;

    fn spark(seed: u64) -> Particle {
        let mut rng = fastrand::Rng::with_seed(seed);
        Particle::burst(&mut rng, 100.0, 100.0, Rgb(1, 2, 3), ParticleColors::Random)
    }

    #[test]
    fn burst_randomises_within_ranges() {
        for seed in 0..50 {
            let p = spark(seed);
            assert_eq!(p.alpha, 1.0);
            assert!((0.015..0.035).contains(&p.decay));
            assert!((1.5..3.5).contains(&p.radius));
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((1.99..7.01).contains(&speed));
        }
    }

    #[test]
    fn random_mode_ignores_hint() {
        for seed in 0..50 {
            let p = spark(seed);
            assert!(NEON.contains(&p.color));
        }
    }

    #[test]
    fn inherit_mode_uses_hint() {
        let mut rng = fastrand::Rng::with_seed(3);
        let hint = Rgb(10, 20, 30);
        let p = Particle::burst(&mut rng, 0.0, 0.0, hint, ParticleColors::Inherit);
        assert_eq!(p.color, hint);
    }

    #[test]
    fn update_applies_drag_then_gravity() {
        let mut p = spark(1);
        p.vx = 2.0;
        p.vy = -1.0;
        p.update();

        assert!((p.vx - 1.96).abs() < 1e-6);
        assert!((p.vy - (-0.98 + GRAVITY)).abs() < 1e-6);
        assert!((p.x - 101.96).abs() < 1e-4);
        assert!((p.y - (100.0 - 0.98 + GRAVITY)).abs() < 1e-4);
    }

    #[test]
    fn alpha_strictly_decreases() {
        let mut p = spark(9);
        let mut last = p.alpha;
        while !p.is_dead() {
            p.update();
            assert!(p.alpha < last);
            last = p.alpha;
        }
    }

    #[test]
    fn dies_after_reciprocal_of_decay_updates() {
        for decay in [0.0625_f32, 0.125, 0.25, 0.5] {
            let mut p = spark(4).with_decay(decay);
            let steps = (1.0 / decay).floor() as usize;
            for _ in 0..steps - 1 {
                p.update();
                assert!(!p.is_dead());
            }
            p.update();
            assert!(p.is_dead(), "decay {decay} still alive after {steps} updates");
        }
    }

    #[test]
    fn draw_restores_surface_style() {
        let mut canvas = Canvas::new(200, 200, 8);
        spark(2).draw(&mut canvas);

        // A default opaque black fill after the draw proves alpha and fill were restored
        canvas.fill_rect(96.0, 96.0, 8.0, 8.0);
        assert_eq!(canvas.pixel(12, 12), [0.0, 0.0, 0.0, 1.0]);
    }
}
