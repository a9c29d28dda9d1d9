use crate::file::file::{fileclose, filealloc};
use crate::file::FDType::FD_PIPE;
use crate::file::File;
use crate::kalloc::KMEM;
use crate::proc::{either_copyin, either_copyout, killed, myproc, sleep, wakeup};
use crate::spinlock::Spinlock;

const PIPESIZE: usize = 512;
pub struct Pipe {
    lock: Spinlock,
    data: [u8; PIPESIZE],
    nread: u32, // number of bytes read
    nwrite: u32, // number of bytes written
    readopen: bool, // read fd is still open
    writeopen: bool, // write fd is still open
}

// Allocate a pipe: a pair of files sharing one Pipe, returned as
// (read end, write end).
pub fn pipealloc() -> Option<(*mut File, *mut File)> {
    let f0: *mut File = filealloc()? as *mut File;
    let f1: *mut File = match filealloc() {
        Some(f) => f as *mut File,
        None => {
            unsafe { fileclose(&mut *f0); }
            return None;
        }
    };

    let pi: *mut Pipe = unsafe { KMEM.kalloc() };
    if pi.is_null() {
        unsafe {
            fileclose(&mut *f0);
            fileclose(&mut *f1);
        }
        return None;
    }

    unsafe {
        (*pi).lock = Spinlock::init_lock("pipe");
        (*pi).nread = 0;
        (*pi).nwrite = 0;
        (*pi).readopen = true;
        (*pi).writeopen = true;

        let rf = &mut *f0;
        rf.file_type = FD_PIPE;
        rf.readable = true;
        rf.writable = false;
        rf.pipe = Some(pi);

        let wf = &mut *f1;
        wf.file_type = FD_PIPE;
        wf.readable = false;
        wf.writable = true;
        wf.pipe = Some(pi);
    }

    Some((f0, f1))
}

impl Pipe {
    // Read up to n bytes from the pipe into addr (user or kernel,
    // depending on is_user_dst). Blocks until data is available or
    // the write end is closed.
    pub(crate) fn read(self: &mut Self, is_user_dst: bool, addr: usize, n: usize) -> i32 {
        self.lock.acquire();
        while self.nread == self.nwrite && self.writeopen {
            if myproc().killed() != 0 {
                self.lock.release();
                return -1;
            }
            sleep(&self.nread as *const u32 as *const u8, &mut self.lock);
        }

        let mut read = 0;
        while read < n {
            if self.nread == self.nwrite {
                break;
            }
            let c = self.data[(self.nread as usize) % PIPESIZE];
            self.nread += 1;
            if either_copyout(
                is_user_dst,
                (addr + read) as *mut u8,
                &c as *const u8,
                1,
            ) == -1
            {
                break;
            }
            read += 1;
        }

        wakeup(&self.nwrite as *const u32 as *const u8);
        self.lock.release();
        read as i32
    }

    // Write n bytes from addr (user or kernel) into the pipe. Blocks
    // while the buffer is full; fails once the read end is closed.
    pub(crate) fn write(self: &mut Self, is_user_src: bool, addr: usize, n: usize) -> i32 {
        self.lock.acquire();
        let mut written = 0;
        while written < n {
            if !self.readopen || killed(myproc()) != 0 {
                self.lock.release();
                return -1;
            }

            if self.nwrite == self.nread + PIPESIZE as u32 {
                wakeup(&self.nread as *const u32 as *const u8);
                sleep(&self.nwrite as *const u32 as *const u8, &mut self.lock);
                continue;
            }

            let mut c: u8 = 0;
            if either_copyin(&mut c as *mut u8, is_user_src, (addr + written) as *const u8, 1) == -1 {
                break;
            }
            self.data[(self.nwrite as usize) % PIPESIZE] = c;
            self.nwrite += 1;
            written += 1;
        }

        wakeup(&self.nread as *const u32 as *const u8);
        self.lock.release();
        written as i32
    }

    pub(crate) fn close(self: &mut Self, writable: bool) {
        self.lock.acquire();
        if writable {
            self.writeopen = false;
            wakeup(&self.nread as *const u32 as *const u8);
        } else {
            self.readopen = false;
            wakeup(&self.nwrite as *const u32 as *const u8);
        }
        if !self.readopen && !self.writeopen {
            self.lock.release();
            unsafe { KMEM.kfree(self as *mut Pipe); }
        } else {
            self.lock.release();
        }
    }
}