use barrage::{MalformedPacket, Replica, Viewport};
use glam::Vec2;
use rand::Rng;

/// In-process transport: every broadcast packet is handed to each peer
/// replica, optionally dropping some to mimic a lossy link.
pub struct Loopback {
    peers: Vec<Replica>,
    loss_percent: f32,
    lost: u64,
}

impl Loopback {
    pub fn new(peers: Vec<Replica>, loss_percent: f32) -> Self {
        Self {
            peers,
            loss_percent: loss_percent.clamp(0.0, 100.0),
            lost: 0,
        }
    }

    pub fn peers(&self) -> &[Replica] {
        &self.peers
    }

    pub fn lost(&self) -> u64 {
        self.lost
    }

    /// Returns the peers that rejected the packet.
    pub fn deliver<R: Rng>(
        &mut self,
        packet: &[u8],
        viewport: &dyn Viewport,
        rng: &mut R,
    ) -> Vec<(usize, MalformedPacket)> {
        let mut rejected = Vec::new();
        for (index, peer) in self.peers.iter_mut().enumerate() {
            if self.loss_percent > 0.0 && rng.random::<f32>() * 100.0 < self.loss_percent {
                self.lost += 1;
                continue;
            }
            if let Err(err) = peer.receive(packet, viewport) {
                rejected.push((index, err));
            }
        }
        rejected
    }

    /// Peers simulate their own bullets. Their spread requests are ignored:
    /// only the authority's replica feeds the generators.
    pub fn tick(&mut self, dt: f32, viewport: &dyn Viewport, target: Option<Vec2>) {
        for peer in &mut self.peers {
            peer.tick(dt, viewport, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barrage::net::encode_level;
    use barrage::{OrthoViewport, ReplicaConfig};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn peers(n: usize) -> Vec<Replica> {
        (0..n).map(|_| Replica::new(ReplicaConfig::default())).collect()
    }

    #[test]
    fn lossless_delivery_reaches_everyone() {
        let viewport = OrthoViewport::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut loopback = Loopback::new(peers(3), 0.0);

        let rejected = loopback.deliver(&encode_level(2.0), &viewport, &mut rng);
        assert!(rejected.is_empty());
        assert_eq!(loopback.lost(), 0);
        assert!(loopback.peers().iter().all(|p| (p.level() - 2.0).abs() < 1e-5));
    }

    #[test]
    fn total_loss_delivers_nothing() {
        let viewport = OrthoViewport::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut loopback = Loopback::new(peers(2), 100.0);

        loopback.deliver(&encode_level(2.0), &viewport, &mut rng);
        assert_eq!(loopback.lost(), 2);
        assert!(loopback.peers().iter().all(|p| p.stats().packets_received == 0));
    }

    #[test]
    fn garbage_is_reported_per_peer() {
        let viewport = OrthoViewport::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut loopback = Loopback::new(peers(2), 0.0);

        let rejected = loopback.deliver(&[0xFF, 0x00], &viewport, &mut rng);
        let indices: Vec<usize> = rejected.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1]);
    }
}
