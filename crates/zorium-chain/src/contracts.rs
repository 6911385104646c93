//! Solidity bindings for the contracts Zorium reads.

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IZoriumFactory {
        function collectionCount() external view returns (uint256);
        function collectionAt(uint256 index) external view returns (address);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    interface IZoriumCollection {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function owner() external view returns (address);
        function contractURI() external view returns (string);
        function nextTokenId() external view returns (uint256);
        function uri(uint256 tokenId) external view returns (string);
        function totalSupply(uint256 tokenId) external view returns (uint256);
    }
}
