//! Status LED adapter

use embedded_hal::digital::StatefulOutputPin;
use fpgalink_hal::OutputPin;

/// Status LED on any `embedded-hal` output
///
/// The level is tracked locally so reading it back needs no `&mut` access
/// to the pin.
pub struct LedPin<P> {
    pin: P,
    high: bool,
}

impl<P: StatefulOutputPin> LedPin<P> {
    pub fn new(mut pin: P) -> Self {
        let high = pin.is_set_high().unwrap_or(false);
        Self { pin, high }
    }

    /// Give back the wrapped pin
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P: StatefulOutputPin> OutputPin for LedPin<P> {
    fn set_high(&mut self) {
        // GPIO writes on the RP2040 are infallible
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
