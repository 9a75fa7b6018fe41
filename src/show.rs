use crate::config::Tuning;
use crate::firework::Firework;
use crate::palette::Rgb;
use crate::surface::{Composite, Scoped, Surface};

const REPORT_EVERY: u64 = 600;

/// The running display: every live firework plus the surface they paint on.
pub struct Show<S: Surface> {
    surface: S,
    fireworks: Vec<Firework>,
    rng: fastrand::Rng,
    tuning: Tuning,
    frame: u64,
}

impl<S: Surface> Show<S> {
    pub fn new(surface: S, tuning: Tuning) -> Self {
        Self::with_rng(surface, tuning, fastrand::Rng::new())
    }

    pub fn with_seed(surface: S, tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(surface, tuning, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(surface: S, tuning: Tuning, rng: fastrand::Rng) -> Self {
        Self {
            surface,
            fireworks: Vec::with_capacity(tuning.max_fireworks),
            rng,
            tuning,
            frame: 0,
        }
    }

    /// Advances one frame: fade trails, maybe launch, update and draw, prune.
    pub fn tick(&mut self) {
        self.frame += 1;
        let (width, height) = (self.surface.width(), self.surface.height());

        self.surface.set_composite(Composite::DestinationOut);
        {
            let mut ctx = Scoped::new(&mut self.surface);
            ctx.set_global_alpha(self.tuning.trail_fade);
            ctx.set_fill(Rgb::BLACK);
            ctx.fill_rect(0.0, 0.0, width as f32, height as f32);
        }
        self.surface.set_composite(Composite::Lighter);

        if self.rng.f32() < self.tuning.spawn_chance {
            if self.fireworks.len() < self.tuning.max_fireworks {
                self.fireworks.push(Firework::launch(
                    &mut self.rng,
                    width,
                    height,
                    self.tuning.particle_colors,
                ));
            } else {
                log::debug!("launch skipped, {} fireworks already live", self.fireworks.len());
            }
        }

        let Self {
            surface,
            fireworks,
            rng,
            ..
        } = self;
        fireworks.retain_mut(|firework| {
            firework.update(rng);
            firework.draw(surface);
            !firework.is_spent()
        });

        if self.frame % REPORT_EVERY == 0 {
            log::debug!(
                "frame {}: {} fireworks, {} particles",
                self.frame,
                self.fireworks.len(),
                self.live_particles()
            );
        }
    }

    /// Takes effect before the next tick draws anything.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!(
            "viewport {}x{} -> {}x{}",
            self.surface.width(),
            self.surface.height(),
            width,
            height
        );
        self.surface.resize(width, height);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn fireworks(&self) -> &[Firework] {
        &self.fireworks
    }

    pub fn live_particles(&self) -> usize {
        self.fireworks.iter().map(|fw| fw.particles().len()).sum()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, firework: Firework) {
        self.fireworks.push(firework);
    }
}
