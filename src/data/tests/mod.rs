mod dataloader;
mod download;
mod idx;
