use crate::palette::{self, Rgb};
use crate::particle::{Particle, ParticleColors};
use crate::surface::{Scoped, Surface};

const ROCKET_RADIUS: f32 = 4.0;
const ROCKET_GLOW: f32 = 15.0;

/// A rocket that climbs to `target_y`, then bursts into particles.
///
/// Once exploded the rocket itself stays where it burst; only its particles
/// move. It is spent when the last of them has faded.
#[derive(Clone, Debug)]
pub struct Firework {
    x: f32,
    y: f32,
    target_y: f32,
    speed: f32,
    color: Rgb,
    exploded: bool,
    particles: Vec<Particle>,
    particle_count: usize,
    colors: ParticleColors,
}

impl Firework {
    /// Random rocket rising from the bottom edge of a `width` x `height` viewport.
    pub fn launch(
        rng: &mut fastrand::Rng,
        width: u32,
        height: u32,
        colors: ParticleColors,
    ) -> Self {
        let (width, height) = (width as f32, height as f32);
        let x = rng.f32() * width;
        let target_y = rng.f32() * (height * 0.4) + 50.0;
        let speed = rng.f32() * 2.0 + 10.0;
        let color = palette::pick(rng);
        let particle_count = rng.usize(50..100);

        Self::new(x, height, target_y, speed, color, particle_count).with_colors(colors)
    }

    pub fn new(
        x: f32,
        y: f32,
        target_y: f32,
        speed: f32,
        color: Rgb,
        particle_count: usize,
    ) -> Self {
        Self {
            x,
            y,
            target_y,
            speed,
            color,
            exploded: false,
            particles: Vec::new(),
            particle_count,
            colors: ParticleColors::default(),
        }
    }

    pub fn with_colors(mut self, colors: ParticleColors) -> Self {
        self.colors = colors;
        self
    }

    pub fn update(&mut self, rng: &mut fastrand::Rng) {
        if !self.exploded {
            self.y -= self.speed;
            if self.y <= self.target_y {
                self.explode(rng);
            }
            return;
        }

        self.particles.retain_mut(|particle| {
            particle.update();
            !particle.is_dead()
        });
    }

    /// Bursts into `particle_count` particles at the current position.
    ///
    /// Must be called at most once; `update` does so when the rocket
    /// reaches its target.
    pub fn explode(&mut self, rng: &mut fastrand::Rng) {
        debug_assert!(!self.exploded, "firework exploded twice");
        if self.exploded {
            return;
        }
        self.exploded = true;
        self.particles.reserve_exact(self.particle_count);
        for _ in 0..self.particle_count {
            self.particles
                .push(Particle::burst(rng, self.x, self.y, self.color, self.colors));
        }
        log::trace!(
            "burst of {} at ({:.0}, {:.0})",
            self.particle_count,
            self.x,
            self.y
        );
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.exploded {
            for particle in &self.particles {
                particle.draw(surface);
            }
            return;
        }

        let mut ctx = Scoped::new(surface);
        ctx.set_shadow(ROCKET_GLOW, self.color);
        ctx.set_fill(self.color);
        ctx.fill_circle(self.x, self.y, ROCKET_RADIUS);
    }

    /// Exploded with every particle faded out.
    pub fn is_spent(&self) -> bool {
        self.exploded && self.particles.is_empty()
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn target_y(&self) -> f32 {
        self.target_y
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[cfg(test)]
    pub(crate) fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }
}
