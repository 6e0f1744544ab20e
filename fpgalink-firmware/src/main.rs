//! fpgalink - UART/USB bridge firmware
//!
//! Bridges an FPGA soft core on UART0 to a host computer over a USB CDC-ACM
//! virtual serial port, for RP2040-based boards.
//!
//! Execution contexts:
//! - Interrupt executor (SWI_IRQ_1): peer UART ingestion into the ring
//! - Thread executor: flush loop + heartbeat (this task), USB device task,
//!   host → peer task

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_futures::yield_now;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{UART0, USB};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_time::Instant;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::Builder;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use fpgalink_core::{BridgeContext, FlushOutcome, RingStats};
use fpgalink_hal_rp2040::{uart_config, CdcHostTx, LedPin, UartPeerRx, UartPeerTx};

mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
});

/// Interrupt-priority executor running the ingestion task
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Full-speed CDC-ACM bulk packet size
const CDC_PACKET_SIZE: u16 = 64;

// Static cells (must live forever for task references)
static CONTEXT: StaticCell<BridgeContext> = StaticCell::new();
static UART_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static UART_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("fpgalink bridge starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let ctx: &'static BridgeContext = CONTEXT.init(BridgeContext::new(config::load_config()));
    let cfg = ctx.config();

    // Peer UART (UART0: TX=GPIO0, RX=GPIO1)
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(cfg.uart.baudrate));
    let uart = uart.into_buffered(Irqs, UART_TX_BUF.init([0u8; 256]), UART_RX_BUF.init([0u8; 256]));
    let (uart_tx, uart_rx) = uart.split();
    info!("UART0 initialized at {} baud", cfg.uart.baudrate);

    // USB CDC-ACM function
    let driver = Driver::new(p.USB, Irqs);
    let mut builder = Builder::new(
        driver,
        config::usb_config(&cfg.usb),
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), CDC_PACKET_SIZE);
    let usb = builder.build();
    let (sender, receiver) = class.split();
    info!(
        "USB CDC-ACM initialized ({=u16:#x}:{=u16:#x})",
        cfg.usb.vid, cfg.usb.pid
    );

    // Ingestion runs above thread mode but below the UART and USB IRQs
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    unwrap!(high_spawner.spawn(tasks::ingest_task(ctx.ingestion(), UartPeerRx::new(uart_rx))));

    unwrap!(spawner.spawn(tasks::usb_task(usb)));
    unwrap!(spawner.spawn(tasks::host_rx_task(
        receiver,
        UartPeerTx::new(uart_tx),
        ctx.egress()
    )));

    info!("All tasks spawned, bridge running");

    // Status LED (GPIO25 on the Pico)
    let mut led = LedPin::new(Output::new(p.PIN_25, Level::Low));
    let mut host = CdcHostTx::new(sender, cfg.flush.attempt_limit());
    let mut flush = ctx.flush_scheduler();
    let mut heartbeat = ctx.heartbeat();
    let mut seen = RingStats::default();

    loop {
        // Millisecond clock wraps every ~49 days; the heartbeat copes
        let now_ms = Instant::now().as_millis() as u32;

        match flush.run_once(&mut host).await {
            FlushOutcome::Idle => {}
            FlushOutcome::Sent(n) => trace!("Flushed {} bytes", n),
            FlushOutcome::Abandoned { len, last_error } => {
                warn!("Dropped {} byte chunk: {:?}", len, last_error);
            }
        }

        heartbeat.poll(now_ms, &mut led);

        report_ring_loss(ctx.ring().stats(), &mut seen);

        // Nothing above awaits when the ring is empty
        yield_now().await;
    }
}

/// Log bytes lost to overflow since the last call
fn report_ring_loss(stats: RingStats, seen: &mut RingStats) {
    let overwritten = stats.overwritten.wrapping_sub(seen.overwritten);
    let rejected = stats.rejected.wrapping_sub(seen.rejected);
    if overwritten > 0 {
        warn!("Ring overflow: {} unread bytes overwritten", overwritten);
    }
    if rejected > 0 {
        warn!("Ring overflow: {} incoming bytes dropped", rejected);
    }
    *seen = stats;
}
