use core::fmt::{Error, Write};

use crate::file::{CONSOLE, Devsw, DEVSW};
use crate::proc::{either_copyin, either_copyout, myproc, procdump, sleep, wakeup};
use crate::spinlock::Spinlock;
use crate::uart::UART_INSTANCE;

pub(crate) static mut CONSOLE_INSTANCE: Console = Console::create();

const BACKSPACE: u16 = 0x100;

// control-x, matching the C xv6 macro: (x) - '@'
const fn ctrl(x: u8) -> u8 {
    x - b'@'
}
const CTRL_P: u8 = ctrl(b'P');
const CTRL_U: u8 = ctrl(b'U');
const CTRL_H: u8 = ctrl(b'H');
const CTRL_D: u8 = ctrl(b'D');
const DEL: u8 = 0x7f;

const INPUT_BUF_SIZE: usize = 128;
pub struct Console {
    lock: Spinlock,
    // input
    buf: [u8; INPUT_BUF_SIZE],
    r: usize, // Read index
    w: usize, // Write index
    e: usize, // Edit index
}

impl Console {
    pub const fn create() -> Self {
        Self {
            lock: Spinlock::init_lock("cons"),
            buf: [0; INPUT_BUF_SIZE],
            r: 0,
            w: 0,
            e: 0,
        }
    }
    pub fn init() {
        // connect read and write system calls
        // to consoleread and consolewrite.
        unsafe {
            DEVSW[CONSOLE] = Some(&mut CONSOLE_INSTANCE);
        }
    }

    // send one character to the uart.
    // called by printf(), and to echo input characters,
    // but not from write().
    pub fn putc(self: &mut Self, c: u16) {
        unsafe {
            if c == BACKSPACE {
                // if the user typed backspace, overwrite with a space.
                UART_INSTANCE.putc_sync(0x08); // ascii \b char
                UART_INSTANCE.putc_sync(0x20); // ascii space char
                UART_INSTANCE.putc_sync(0x08); // ascii \b char
            } else {
                UART_INSTANCE.putc_sync(c as u8);
            }
        }
    }

    //
    // the console input interrupt handler.
    // uartintr() calls this for input character.
    // do erase/kill processing, append to cons.buf,
    // wake up consoleread() if a whole line has arrived.
    //
    pub(crate) fn consoleintr(self: &mut Self, c: u8) {
        self.lock.acquire();

        match c {
            // Print process list.
            CTRL_P => procdump(),
            // Kill line.
            CTRL_U => {
                while self.e != self.w && self.buf[(self.e - 1) % INPUT_BUF_SIZE] != b'\n' {
                    self.e -= 1;
                    self.putc(BACKSPACE);
                }
            }
            // Backspace | Delete key
            CTRL_H | DEL => {
                if self.e != self.w {
                    self.e -= 1;
                    self.putc(BACKSPACE);
                }
            }
            _ => {
                if c != 0 && self.e - self.r < INPUT_BUF_SIZE {
                    let c = if c == b'\r' { b'\n' } else { c };

                    // echo back to the user.
                    self.putc(c as u16);

                    // store for consumption by consoleread().
                    self.buf[self.e % INPUT_BUF_SIZE] = c;
                    self.e += 1;

                    if c == b'\n' || c == CTRL_D || self.e - self.r == INPUT_BUF_SIZE {
                        // wake up consoleread() if a whole line (or end-of-file)
                        // has arrived.
                        self.w = self.e;
                        wakeup(&self.r as *const usize as *const u8);
                    }
                }
            }
        }

        self.lock.release();
    }
}

impl Write for Console {
    // The trait Write expects us to write the function write_str
    // which looks like:
    fn write_str(&mut self, s: &str) -> Result<(), Error> {
        for c in s.bytes() {
            self.putc(c as u16);
        }
        // Return that we succeeded.
        Ok(())
    }
}

impl Devsw for Console {
    //
    // user read()s from the console go here.
    // copy (up to) a whole input line to dst.
    // user_dist indicates whether dst is a user
    // or kernel address.
    //
    fn read(self: &mut Self, is_user_dst: bool, dst: usize, sz: usize) -> i32 {
        let target = sz;
        let mut dst = dst;
        let mut sz = sz;

        self.lock.acquire();
        while sz > 0 {
            // wait until interrupt handler has put some
            // input into cons.buffer.
            while self.r == self.w {
                if myproc().killed() != 0 {
                    self.lock.release();
                    return -1;
                }
                sleep(&self.r as *const usize as *const u8, &mut self.lock);
            }

            let c = self.buf[self.r % INPUT_BUF_SIZE];
            self.r += 1;

            if c == CTRL_D {
                // end-of-file
                if sz < target {
                    // Save ^D for next time, to make sure
                    // caller gets a 0-byte result.
                    self.r -= 1;
                }
                break;
            }

            // copy the input byte to the user-space buffer.
            let cbuf = c;
            if either_copyout(is_user_dst, dst as *mut u8, &cbuf, 1) == -1 {
                break;
            }

            dst += 1;
            sz -= 1;

            if c == b'\n' {
                // a whole line has arrived, return to
                // the user-level read().
                break;
            }
        }
        self.lock.release();

        return (target - sz) as i32;
    }

    fn write(self: &mut Self, is_user_src: bool, src: usize, sz: usize) -> i32 {
        let mut cnt = 0i32;
        for i in 0..sz {
            let mut c = 0u8;
            if either_copyin(&mut c as *mut u8, is_user_src, src as *const u8, 1) == -1 {
                break;
            }
            self.putc(c as u16);
            cnt = (i + 1) as i32;
        }

        return cnt;
    }
}

// The line-discipline arithmetic above doesn't touch any CSR or MMIO
// register, so it is exercised directly on the host, matching scenarios
// A-C.
#[cfg(test)]
mod tests {
    use super::*;

    // a minimal stand-in that reproduces consoleintr's buffer arithmetic
    // without the spinlock/scheduler dependencies, so the line discipline
    // can be asserted on the host.
    struct Ring {
        buf: [u8; INPUT_BUF_SIZE],
        r: usize,
        w: usize,
        e: usize,
        echo_count: usize,
    }

    impl Ring {
        fn new() -> Self {
            Ring { buf: [0; INPUT_BUF_SIZE], r: 0, w: 0, e: 0, echo_count: 0 }
        }

        fn intr(&mut self, c: u8) {
            match c {
                CTRL_U => {
                    while self.e != self.w && self.buf[(self.e - 1) % INPUT_BUF_SIZE] != b'\n' {
                        self.e -= 1;
                        self.echo_count += 1;
                    }
                }
                CTRL_H | DEL => {
                    if self.e != self.w {
                        self.e -= 1;
                        self.echo_count += 1;
                    }
                }
                _ => {
                    if c != 0 && self.e - self.r < INPUT_BUF_SIZE {
                        let c = if c == b'\r' { b'\n' } else { c };
                        self.echo_count += 1;
                        self.buf[self.e % INPUT_BUF_SIZE] = c;
                        self.e += 1;
                        if c == b'\n' || c == CTRL_D || self.e - self.r == INPUT_BUF_SIZE {
                            self.w = self.e;
                        }
                    }
                }
            }
        }

        fn visible(&self) -> &[u8] {
            &self.buf[self.r..self.w]
        }

        // mirrors Devsw::read's consume loop (console.rs:136-184): drops a
        // consumed ^D from the delivered bytes, but pushes it back for the
        // next call if it terminates a non-empty read.
        fn read_line(&mut self, max: usize) -> ([u8; INPUT_BUF_SIZE], usize) {
            let target = max;
            let mut sz = max;
            let mut out = [0u8; INPUT_BUF_SIZE];
            let mut n = 0;
            while sz > 0 {
                if self.r == self.w {
                    break;
                }
                let c = self.buf[self.r % INPUT_BUF_SIZE];
                self.r += 1;
                if c == CTRL_D {
                    if sz < target {
                        self.r -= 1;
                    }
                    break;
                }
                out[n] = c;
                n += 1;
                sz -= 1;
                if c == b'\n' {
                    break;
                }
            }
            (out, n)
        }
    }

    #[test]
    fn scenario_a_line_read() {
        let mut ring = Ring::new();
        for &c in b"hi\n" {
            ring.intr(c);
        }
        assert_eq!(ring.visible(), b"hi\n");
    }

    #[test]
    fn scenario_b_eof_pushback() {
        let mut ring = Ring::new();
        ring.intr(b'a');
        ring.intr(b'b');
        ring.intr(CTRL_D);
        let (out, n) = ring.read_line(INPUT_BUF_SIZE);
        assert_eq!(&out[..n], b"ab");
        // the ^D that terminated a non-empty read is pushed back, so the
        // next read sees it immediately and delivers a 0-byte EOF.
        let (_out2, n2) = ring.read_line(INPUT_BUF_SIZE);
        assert_eq!(n2, 0);
    }

    #[test]
    fn scenario_c_line_kill() {
        let mut ring = Ring::new();
        for &c in b"abc" {
            ring.intr(c);
        }
        ring.intr(CTRL_U);
        for &c in b"d\n" {
            ring.intr(c);
        }
        assert_eq!(ring.visible(), b"d\n");
        assert_eq!(ring.echo_count, b"abc".len() + 3 + b"d\n".len());
    }
}
