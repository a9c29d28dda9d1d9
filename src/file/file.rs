use crate::file::FDType::{FD_DEVICE, FD_INODE, FD_NONE, FD_PIPE};
use crate::file::{DEVSW, File};
use crate::log::{begin_op, end_op};
use crate::param::{NDEV, NFILE};
use crate::spinlock::Spinlock;

struct FTable {
    lock: Spinlock,
    file: [File; NFILE]
}

static mut FTABLE: FTable = FTable {
    lock: Spinlock::init_lock("ftable"),
    file: [File::create(); NFILE],
};

pub fn fileinit() {
    // empty due to FTABLE has already been initialized
}

// Allocate a file structure.
pub fn filealloc() -> Option<&'static mut File> {
    unsafe {
        FTABLE.lock.acquire();
        for f in &mut FTABLE.file {
            if f.ref_cnt == 0 {
                f.ref_cnt = 1;
                FTABLE.lock.release();
                return Some(f);
            }
        }

        FTABLE.lock.release();
        return None;
    }
}

// Increment ref count for file f.
pub(crate) fn filedup(f: *mut File) {
    unsafe {
        FTABLE.lock.acquire();
        let f = f.as_mut().unwrap();
        if f.ref_cnt < 1 {
            panic!("filedup")
        }

        f.ref_cnt += 1;
        FTABLE.lock.release();
    }
}

// Close file f.  (Decrement ref count, close when reaches 0.)
pub(crate) fn fileclose(f: &mut File) {
    unsafe {
        FTABLE.lock.acquire();
        if f.ref_cnt < 1 {
            panic!("fileclose");
        }

        f.ref_cnt -= 1;
        if f.ref_cnt > 0 {
            FTABLE.lock.release();
            return;
        }

        let file_type = f.file_type;
        let pipe = f.pipe;
        let writable = f.writable;
        let ip = f.ip;

        f.ref_cnt = 0;
        f.file_type = FD_NONE;
        FTABLE.lock.release();

        if file_type == FD_PIPE {
            pipe.unwrap().as_mut().unwrap().close(writable);
        } else if file_type == FD_INODE || file_type == FD_DEVICE {
            begin_op();
            ip.unwrap().as_mut().unwrap().iput();
            end_op();
        }
    }
}

// Read from file f, storing into addr (user or kernel, per is_user_dst).
pub fn fileread(f: &mut File, is_user_dst: bool, addr: usize, n: usize) -> i32 {
    if !f.readable {
        return -1;
    }

    unsafe {
        match f.file_type {
            FD_PIPE => f.pipe.unwrap().as_mut().unwrap().read(is_user_dst, addr, n),
            FD_DEVICE => {
                if f.major < 0 || f.major as usize >= NDEV {
                    return -1;
                }
                match DEVSW[f.major as usize].as_mut() {
                    None => -1,
                    Some(dev) => dev.read(is_user_dst, addr, n),
                }
            }
            FD_INODE => {
                let ip = f.ip.unwrap().as_mut().unwrap();
                ip.ilock();
                let r = ip.readi(is_user_dst, addr as *mut u8, f.off, n);
                if r > 0 {
                    f.off += r as u32;
                }
                ip.iunlock();
                r as i32
            }
            FD_NONE => panic!("fileread"),
        }
    }
}

// Write to file f, reading from addr (user or kernel, per is_user_src).
// Returns n on full success, -1 on any failure (no partial writes are
// reported as short counts — matches the all-or-nothing contract user
// code expects from write()).
pub fn filewrite(f: &mut File, is_user_src: bool, addr: usize, n: usize) -> i32 {
    if !f.writable {
        return -1;
    }

    unsafe {
        match f.file_type {
            FD_PIPE => f.pipe.unwrap().as_mut().unwrap().write(is_user_src, addr, n),
            FD_DEVICE => {
                if f.major < 0 || f.major as usize >= NDEV {
                    return -1;
                }
                match DEVSW[f.major as usize].as_mut() {
                    None => -1,
                    Some(dev) => dev.write(is_user_src, addr, n),
                }
            }
            FD_INODE => {
                begin_op();
                let ip = f.ip.unwrap().as_mut().unwrap();
                ip.ilock();
                let r = ip.writei(is_user_src, addr as *mut u8, f.off, n);
                if r > 0 {
                    f.off += r as u32;
                }
                ip.iunlock();
                end_op();
                if r == n as isize { n as i32 } else { -1 }
            }
            FD_NONE => panic!("filewrite"),
        }
    }
}
