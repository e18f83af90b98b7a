use std::borrow::Borrow;
use std::marker::PhantomData;

use crate::utils::handle::Handle;
use crate::utils::handle_pool::HandlePool;

/// Versioned storage of backend objects, indexed by handle.
#[derive(Debug)]
pub struct DataVec<T>
where
    T: Sized + Clone,
{
    pub buf: Vec<Option<T>>,
    pub versions: Vec<u32>,
}

impl<T> DataVec<T>
where
    T: Sized + Clone,
{
    pub fn new() -> Self {
        DataVec {
            buf: Vec::new(),
            versions: Vec::new(),
        }
    }

    pub fn get<H>(&self, handle: H) -> Option<&T>
    where
        H: Borrow<Handle>,
    {
        let index = handle.borrow().index() as usize;
        if let Some(&v) = self.versions.get(index) {
            if v == handle.borrow().version() {
                return self.buf[index].as_ref();
            }
        }

        None
    }

    pub fn create<H>(&mut self, handle: H, value: T)
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;

        if self.buf.len() <= index {
            self.buf.resize(index + 1, None);
            self.versions.resize(index + 1, 0);
        }

        self.buf[index] = Some(value);
        self.versions[index] = handle.version();
    }

    pub fn free<H>(&mut self, handle: H) -> Option<T>
    where
        H: Borrow<Handle>,
    {
        let handle = handle.borrow();
        let index = handle.index() as usize;
        if self.versions.get(index) != Some(&handle.version()) {
            None
        } else {
            self.buf[index].take()
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter().filter_map(|v| v.as_ref())
    }
}

/// A `HandlePool` paired with the data of every alive handle.
pub struct Objects<H, T>
where
    T: Sized + Clone,
{
    handles: HandlePool,
    data: DataVec<T>,
    _phantom: PhantomData<H>,
}

impl<H, T> Objects<H, T>
where
    H: From<Handle> + Borrow<Handle> + Copy,
    T: Sized + Clone,
{
    pub fn new() -> Self {
        Objects {
            handles: HandlePool::new(),
            data: DataVec::new(),
            _phantom: PhantomData,
        }
    }

    pub fn create(&mut self, value: T) -> H {
        let handle: H = self.handles.create();
        self.data.create(handle, value);
        handle
    }

    #[inline]
    pub fn get(&self, handle: H) -> Option<&T> {
        self.data.get(handle)
    }

    pub fn free(&mut self, handle: H) -> Option<T> {
        if self.handles.free(handle) {
            self.data.free(handle)
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
