use anyhow::Result;
use std::thread;
use std::time::Duration;

use distance_tracker::encoder::EncoderController;

/// Prints raw absolute position samples at 10 Hz so the cyclic behavior of
/// the source can be eyeballed without the distance pipeline in the way.
fn main() -> Result<()> {
    let freq: u32 = 10;
    let velocity_rps: f64 = std::env::args()
        .nth(1)
        .map(|v| v.parse())
        .transpose()?
        .unwrap_or(0.25);

    let mut encoder = EncoderController::new_simulation(velocity_rps, freq)?;
    println!("Simulated encoder at {:.3} rot/s, {} Hz", velocity_rps, freq);

    loop {
        let raw = encoder.read()?;
        println!("Absolute position: {:.6}", raw);
        thread::sleep(Duration::from_millis(1000 / freq as u64));
    }
}
