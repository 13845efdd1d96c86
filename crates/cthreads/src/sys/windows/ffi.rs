//! The slice of `kernel32` this backend calls.

#![allow(non_camel_case_types, non_snake_case, clippy::upper_case_acronyms)]

use core::ffi::c_void;

pub(crate) type BOOL = i32;
pub(crate) type BOOLEAN = u8;
pub(crate) type DWORD = u32;
pub(crate) type HANDLE = *mut c_void;

pub(crate) const INFINITE: DWORD = 0xFFFF_FFFF;
pub(crate) const WAIT_OBJECT_0: DWORD = 0;
pub(crate) const WAIT_TIMEOUT: DWORD = 258;
pub(crate) const WAIT_FAILED: DWORD = 0xFFFF_FFFF;

pub(crate) const ERROR_NOT_SUPPORTED: i32 = 50;
pub(crate) const ERROR_INVALID_PARAMETER: i32 = 87;
pub(crate) const ERROR_NOT_LOCKED: i32 = 158;
pub(crate) const ERROR_BUSY: i32 = 170;
pub(crate) const ERROR_TIMEOUT: DWORD = 1460;

pub(crate) const STACK_SIZE_PARAM_IS_A_RESERVATION: DWORD = 0x0001_0000;
pub(crate) const FORMAT_MESSAGE_IGNORE_INSERTS: DWORD = 0x0000_0200;
pub(crate) const FORMAT_MESSAGE_FROM_SYSTEM: DWORD = 0x0000_1000;

#[repr(C)]
pub(crate) struct SRWLOCK {
    pub(crate) ptr: *mut c_void,
}

#[repr(C)]
pub(crate) struct CONDITION_VARIABLE {
    pub(crate) ptr: *mut c_void,
}

#[repr(C)]
pub(crate) struct INIT_ONCE {
    pub(crate) ptr: *mut c_void,
}

#[repr(C)]
pub(crate) struct CRITICAL_SECTION {
    debug_info: *mut c_void,
    lock_count: i32,
    recursion_count: i32,
    pub(crate) owning_thread: HANDLE,
    lock_semaphore: HANDLE,
    spin_count: usize,
}

pub(crate) type ThreadStart = unsafe extern "system" fn(param: *mut c_void) -> DWORD;
pub(crate) type InitOnceFn =
    unsafe extern "system" fn(once: *mut INIT_ONCE, param: *mut c_void, context: *mut *mut c_void) -> BOOL;

#[link(name = "kernel32")]
unsafe extern "system" {
    pub(crate) fn GetLastError() -> DWORD;
    pub(crate) fn CloseHandle(handle: HANDLE) -> BOOL;
    pub(crate) fn WaitForSingleObject(handle: HANDLE, ms: DWORD) -> DWORD;

    pub(crate) fn CreateThread(
        security: *mut c_void,
        stack_size: usize,
        start: ThreadStart,
        param: *mut c_void,
        flags: DWORD,
        thread_id: *mut DWORD,
    ) -> HANDLE;
    pub(crate) fn GetCurrentThreadId() -> DWORD;
    pub(crate) fn GetExitCodeThread(thread: HANDLE, code: *mut DWORD) -> BOOL;
    pub(crate) fn ExitThread(code: DWORD) -> !;

    pub(crate) fn InitializeSRWLock(lock: *mut SRWLOCK);
    pub(crate) fn AcquireSRWLockExclusive(lock: *mut SRWLOCK);
    pub(crate) fn AcquireSRWLockShared(lock: *mut SRWLOCK);
    pub(crate) fn TryAcquireSRWLockExclusive(lock: *mut SRWLOCK) -> BOOLEAN;
    pub(crate) fn TryAcquireSRWLockShared(lock: *mut SRWLOCK) -> BOOLEAN;
    pub(crate) fn ReleaseSRWLockExclusive(lock: *mut SRWLOCK);
    pub(crate) fn ReleaseSRWLockShared(lock: *mut SRWLOCK);

    pub(crate) fn InitializeCriticalSection(section: *mut CRITICAL_SECTION);
    pub(crate) fn EnterCriticalSection(section: *mut CRITICAL_SECTION);
    pub(crate) fn TryEnterCriticalSection(section: *mut CRITICAL_SECTION) -> BOOL;
    pub(crate) fn LeaveCriticalSection(section: *mut CRITICAL_SECTION);
    pub(crate) fn DeleteCriticalSection(section: *mut CRITICAL_SECTION);

    pub(crate) fn InitializeConditionVariable(cond: *mut CONDITION_VARIABLE);
    pub(crate) fn SleepConditionVariableSRW(
        cond: *mut CONDITION_VARIABLE,
        lock: *mut SRWLOCK,
        ms: DWORD,
        flags: u32,
    ) -> BOOL;
    pub(crate) fn SleepConditionVariableCS(
        cond: *mut CONDITION_VARIABLE,
        section: *mut CRITICAL_SECTION,
        ms: DWORD,
    ) -> BOOL;
    pub(crate) fn WakeConditionVariable(cond: *mut CONDITION_VARIABLE);
    pub(crate) fn WakeAllConditionVariable(cond: *mut CONDITION_VARIABLE);

    pub(crate) fn CreateSemaphoreW(
        security: *mut c_void,
        initial: i32,
        maximum: i32,
        name: *const u16,
    ) -> HANDLE;
    pub(crate) fn ReleaseSemaphore(sem: HANDLE, count: i32, previous: *mut i32) -> BOOL;

    pub(crate) fn InitOnceExecuteOnce(
        once: *mut INIT_ONCE,
        init: InitOnceFn,
        param: *mut c_void,
        context: *mut *mut c_void,
    ) -> BOOL;

    pub(crate) fn FormatMessageW(
        flags: DWORD,
        source: *const c_void,
        message_id: DWORD,
        language_id: DWORD,
        buffer: *mut u16,
        size: DWORD,
        arguments: *mut c_void,
    ) -> DWORD;
}
